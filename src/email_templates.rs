use crate::domain::WaitlistEmail;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use tera::{Context, Tera};

const TAGLINE: &str = "Transform Your Dental Health with AI";
const FEATURES: [&str; 4] = [
    "AI-powered smile analysis",
    "Smart habit tracking",
    "Personalized dental coaching",
    "Privacy-first approach",
];

/// Templates are compiled into the binary. `.html` templates are auto-escaped by tera, which
/// keeps a signer-supplied address from injecting markup into the admin notification.
static TEMPLATES: Lazy<Tera> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("welcome.html", include_str!("../templates/emails/welcome.html")),
        ("welcome.txt", include_str!("../templates/emails/welcome.txt")),
        ("admin_signup.html", include_str!("../templates/emails/admin_signup.html")),
        ("admin_signup.txt", include_str!("../templates/emails/admin_signup.txt")),
    ])
    .expect("Failed to parse the embedded email templates");
    tera
});

#[derive(Debug)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// The confirmation sent to whoever just joined the waitlist.
pub fn welcome_email(product_name: &str) -> Result<EmailContent, tera::Error> {
    let mut context = Context::new();
    context.insert("product_name", product_name);
    context.insert("tagline", TAGLINE);
    context.insert("features", &FEATURES);

    Ok(EmailContent {
        subject: format!("🦷 Welcome to the {product_name} Waitlist!"),
        html: TEMPLATES.render("welcome.html", &context)?,
        text: TEMPLATES.render("welcome.txt", &context)?,
    })
}

/// The heads-up sent to the admin address for every accepted signup.
pub fn admin_signup_email(
    product_name: &str,
    email: &WaitlistEmail,
    signed_up_at: DateTime<Utc>,
) -> Result<EmailContent, tera::Error> {
    let mut context = Context::new();
    context.insert("product_name", product_name);
    context.insert("email", email.as_ref());
    context.insert(
        "signed_up_at",
        &signed_up_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );

    Ok(EmailContent {
        subject: format!("🎯 New Waitlist Signup - {product_name}"),
        html: TEMPLATES.render("admin_signup.html", &context)?,
        text: TEMPLATES.render("admin_signup.txt", &context)?,
    })
}
