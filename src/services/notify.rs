use chrono::NaiveDate;
use reqwest::Url;

/// Everything the outbound confirmation message mentions.
#[derive(Debug, Clone)]
pub struct BookingSummary {
    pub name: String,
    pub phone: String,
    pub service_name: String,
    pub is_home_service: bool,
    pub date: NaiveDate,
    pub time: String,
    pub duration_minutes: u32,
    pub address: Option<String>,
    pub total_price: u32,
}

pub fn compose_message(summary: &BookingSummary) -> String {
    let service = if summary.is_home_service {
        format!("{} (home service)", summary.service_name)
    } else {
        summary.service_name.clone()
    };

    let mut lines = vec![
        "New booking request".to_string(),
        format!("Name: {}", summary.name),
        format!("Phone: {}", summary.phone),
        format!("Service: {service}"),
        format!("Date: {}", summary.date.format("%d-%m-%Y")),
        format!("Time: {}", summary.time),
        format!("Duration: {} min", summary.duration_minutes),
    ];

    if summary.is_home_service {
        if let Some(address) = &summary.address {
            lines.push(format!("Address: {address}"));
        }
    }

    lines.push(format!("Total: {}", format_price(summary.total_price)));
    lines.join("\n")
}

/// Chilean peso style: `$25.000`.
pub fn format_price(amount: u32) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    format!("${out}")
}

pub fn whatsapp_link(number: &str, text: &str) -> anyhow::Result<Url> {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        anyhow::bail!("no WhatsApp number configured");
    }
    Ok(Url::parse_with_params(
        &format!("https://wa.me/{digits}"),
        &[("text", text)],
    )?)
}

pub fn email_link(to: &str, subject: &str, body: &str) -> anyhow::Result<Url> {
    if to.trim().is_empty() {
        anyhow::bail!("no contact email configured");
    }
    Ok(Url::parse_with_params(
        &format!("mailto:{}", to.trim()),
        &[("subject", subject), ("body", body)],
    )?)
}
