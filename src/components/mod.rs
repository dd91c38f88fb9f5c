mod subscribe_form;
mod test_banner;

pub use subscribe_form::{FormStatus, SubscribeForm};
pub use test_banner::{BannerStatus, HIDE_DELAY, TestBanner};

/// Renders an embedded template with HTML autoescaping on.
pub fn render_template(source: &str, entries: &[(&str, &str)]) -> Result<String, tera::Error> {
    let mut ctx = tera::Context::new();
    for (key, value) in entries.iter().copied() {
        ctx.insert(key, value);
    }
    tera::Tera::one_off(source, &ctx, true)
}
