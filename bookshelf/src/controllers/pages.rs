use actix_web::{
    http::header::{ContentType, LOCATION},
    HttpResponse,
};
use tera::{Context, Tera};

use crate::domain::services::user_session::UserSession;

/// Context shared by every page: the logged in user, if any
pub fn page_context(session: &UserSession) -> Context {
    let user = session.user().ok().flatten();
    let mut context = Context::new();

    context.insert(
        "user_name",
        &user
            .as_ref()
            .map(|user| user.name.clone().unwrap_or_else(|| user.email.clone()))
            .unwrap_or_default(),
    );
    context.insert(
        "user_picture",
        &user.and_then(|user| user.picture).unwrap_or_default(),
    );

    context
}

pub fn render(
    templates: &Tera,
    template_name: &str,
    context: &Context,
) -> Result<HttpResponse, tera::Error> {
    let page = templates.render(template_name, context)?;

    Ok(HttpResponse::Ok()
        .insert_header(ContentType::html())
        .body(page))
}

/// `302 Found` to a relative location
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location))
        .finish()
}
