use tera::Tera;

/// Loads the HTML templates embedded in the binary
///
/// Templates are autoescaped, their names end with `.html`.
pub fn build_templates() -> Result<Tera, tera::Error> {
    let mut templates = Tera::default();

    templates.add_raw_templates(vec![
        ("base.html", include_str!("../templates/base.html")),
        ("list.html", include_str!("../templates/list.html")),
        ("view.html", include_str!("../templates/view.html")),
        ("form.html", include_str!("../templates/form.html")),
        ("profile.html", include_str!("../templates/profile.html")),
        ("error.html", include_str!("../templates/error.html")),
    ])?;

    Ok(templates)
}
