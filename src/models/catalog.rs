use std::collections::HashSet;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub price: u32,
    pub duration_minutes: u32,
    pub description: String,
    #[serde(default)]
    pub includes: Vec<String>,
}

impl Service {
    pub fn duration_for(&self, addon: &HomeServiceAddon, is_home_service: bool) -> u32 {
        if is_home_service {
            self.duration_minutes + addon.extra_minutes
        } else {
            self.duration_minutes
        }
    }

    pub fn price_for(&self, addon: &HomeServiceAddon, is_home_service: bool) -> u32 {
        if is_home_service {
            self.price + addon.surcharge
        } else {
            self.price
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HomeServiceAddon {
    pub surcharge: u32,
    pub extra_minutes: u32,
}

impl Default for HomeServiceAddon {
    fn default() -> Self {
        Self {
            surcharge: 15_000,
            extra_minutes: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecantFamily {
    Masculine,
    Feminine,
    Unisex,
}

impl DecantFamily {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "masculine" => Some(DecantFamily::Masculine),
            "feminine" => Some(DecantFamily::Feminine),
            "unisex" => Some(DecantFamily::Unisex),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecantSize {
    pub ml: u32,
    pub price: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decant {
    pub id: String,
    pub fragrance: String,
    pub house: String,
    pub family: DecantFamily,
    pub sizes: Vec<DecantSize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub services: Vec<Service>,
    #[serde(default)]
    pub home_service: HomeServiceAddon,
    #[serde(default)]
    pub decants: Vec<Decant>,
}

impl Catalog {
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let catalog: Catalog = serde_json::from_str(s)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Reads the catalog from `path` when given, otherwise the built-in one.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read catalog: {path}"))?;
                Self::from_json(&raw).with_context(|| format!("invalid catalog: {path}"))
            }
            None => Ok(Self::builtin()),
        }
    }

    pub fn service(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn filter_decants(
        &self,
        family: Option<DecantFamily>,
        query: Option<&str>,
    ) -> Vec<&Decant> {
        let needle = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        self.decants
            .iter()
            .filter(|d| family.map_or(true, |f| d.family == f))
            .filter(|d| match &needle {
                Some(n) => {
                    d.fragrance.to_lowercase().contains(n) || d.house.to_lowercase().contains(n)
                }
                None => true,
            })
            .collect()
    }

    fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for service in &self.services {
            if service.id.trim().is_empty() || service.name.trim().is_empty() {
                anyhow::bail!("service with empty id or name");
            }
            if service.duration_minutes == 0 {
                anyhow::bail!("service {} has zero duration", service.id);
            }
            if !seen.insert(service.id.as_str()) {
                anyhow::bail!("duplicate service id: {}", service.id);
            }
        }

        let mut seen = HashSet::new();
        for decant in &self.decants {
            if decant.sizes.is_empty() {
                anyhow::bail!("decant {} has no sizes", decant.id);
            }
            if !seen.insert(decant.id.as_str()) {
                anyhow::bail!("duplicate decant id: {}", decant.id);
            }
        }
        Ok(())
    }

    pub fn builtin() -> Self {
        let service = |id: &str,
                       name: &str,
                       price,
                       duration_minutes,
                       description: &str,
                       includes: &[&str]| Service {
            id: id.to_string(),
            name: name.to_string(),
            price,
            duration_minutes,
            description: description.to_string(),
            includes: includes.iter().map(|s| s.to_string()).collect(),
        };
        let decant = |id: &str, fragrance: &str, house: &str, family, prices: [u32; 2]| Decant {
            id: id.to_string(),
            fragrance: fragrance.to_string(),
            house: house.to_string(),
            family,
            sizes: vec![
                DecantSize {
                    ml: 5,
                    price: prices[0],
                },
                DecantSize {
                    ml: 10,
                    price: prices[1],
                },
            ],
        };

        Self {
            services: vec![
                service(
                    "haircut",
                    "Haircut & Styling",
                    25_000,
                    60,
                    "Cut tailored to face shape, finished with a blow-dry.",
                    &["Consultation", "Wash", "Cut", "Blow-dry"],
                ),
                service(
                    "blowout",
                    "Blowout",
                    18_000,
                    45,
                    "Wash and voluminous blow-dry.",
                    &["Wash", "Blow-dry"],
                ),
                service(
                    "color",
                    "Full Color",
                    55_000,
                    120,
                    "Single-process root to tip color.",
                    &["Consultation", "Color", "Wash", "Blow-dry"],
                ),
                service(
                    "balayage",
                    "Balayage",
                    90_000,
                    180,
                    "Hand-painted highlights with toner.",
                    &["Consultation", "Lightening", "Toner", "Treatment", "Styling"],
                ),
                service(
                    "event",
                    "Event Styling",
                    35_000,
                    60,
                    "Updo or waves for weddings and events.",
                    &["Consultation", "Styling", "Finishing spray"],
                ),
            ],
            home_service: HomeServiceAddon::default(),
            decants: vec![
                decant("sauvage", "Sauvage EDP", "Dior", DecantFamily::Masculine, [9_000, 16_000]),
                decant(
                    "bleu",
                    "Bleu de Chanel EDP",
                    "Chanel",
                    DecantFamily::Masculine,
                    [10_000, 18_000],
                ),
                decant(
                    "good-girl",
                    "Good Girl",
                    "Carolina Herrera",
                    DecantFamily::Feminine,
                    [8_000, 14_000],
                ),
                decant(
                    "la-vie",
                    "La Vie Est Belle",
                    "Lancôme",
                    DecantFamily::Feminine,
                    [8_000, 14_000],
                ),
                decant(
                    "br540",
                    "Baccarat Rouge 540",
                    "Maison Francis Kurkdjian",
                    DecantFamily::Unisex,
                    [18_000, 32_000],
                ),
            ],
        }
    }
}
