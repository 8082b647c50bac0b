use actix_session::SessionExt;
use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::LOCATION,
    HttpResponse,
};
use futures::{future::LocalBoxFuture, FutureExt};
use std::{
    future::{ready, Ready},
    rc::Rc,
};
use tracing::info;

use crate::domain::services::user_session::UserSession;

/// Computes the path to come back to once logged in, from the gated request
type ReturnPath = Rc<dyn Fn(&ServiceRequest) -> String>;

/// Middleware letting only logged in users through
///
/// Anonymous users are redirected to the login page, and the path to
/// come back to once logged in is kept in their session.
pub struct LoginMiddleware<S> {
    service: Rc<S>,
    return_path: ReturnPath,
}

impl<S> Service<ServiceRequest> for LoginMiddleware<S>
where
    S: Service<
            ServiceRequest,
            Response = ServiceResponse<actix_web::body::BoxBody>,
            Error = actix_web::Error,
        > + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, actix_web::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let session = UserSession::new(req.get_session());

        if session.is_logged_in() {
            let srv = Rc::clone(&self.service);
            return async move { srv.call(req).await }.boxed_local();
        }

        let return_path = (self.return_path)(&req);
        info!(return_path, "Login required");

        if let Err(error) = session.insert_login_return(&return_path) {
            return Box::pin(ready(Err(error.into())));
        }

        let response = HttpResponse::Found()
            .insert_header((LOCATION, "/login"))
            .finish();

        Box::pin(ready(Ok(req.into_response(response))))
    }
}

/// Middleware factory for requiring a logged in user
pub struct RequireLogin {
    return_path: ReturnPath,
}

impl RequireLogin {
    /// Comes back to the requested path once logged in
    pub fn new() -> Self {
        Self {
            return_path: Rc::new(|req: &ServiceRequest| req.path().to_string()),
        }
    }

    /// Comes back to a path computed from the gated request once logged in
    pub fn returning_to(return_path: impl Fn(&ServiceRequest) -> String + 'static) -> Self {
        Self {
            return_path: Rc::new(return_path),
        }
    }
}

impl Default for RequireLogin {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Transform<S, ServiceRequest> for RequireLogin
where
    S: Service<
            ServiceRequest,
            Response = ServiceResponse<actix_web::body::BoxBody>,
            Error = actix_web::Error,
        > + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = actix_web::Error;
    type Transform = LoginMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoginMiddleware {
            service: Rc::new(service),
            return_path: self.return_path.clone(),
        }))
    }
}
