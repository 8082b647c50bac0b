use url::{Position, Url};

/// URL under which the browser reaches `url`
///
/// The app may run behind a proxy that forwards https traffic to it over plain http.
/// With an `external_host_url`, its scheme and host replace those of `url`.
/// Without one, `http://` is upgraded to `https://`.
pub fn external_url(url: &str, external_host_url: Option<&str>) -> String {
    let external_host_url = match external_host_url {
        Some(external_host_url) => external_host_url,
        None => {
            return match url.strip_prefix("http://") {
                Some(rest) => format!("https://{}", rest),
                None => url.to_string(),
            }
        }
    };

    match Url::parse(url) {
        Ok(parsed) => format!(
            "{}{}",
            external_host_url.trim_end_matches('/'),
            &parsed[Position::BeforePath..]
        ),
        Err(_) => url.to_string(),
    }
}
