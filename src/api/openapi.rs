use super::handlers::{auth, health};
use utoipa::openapi::{
    tag::TagBuilder, Contact, ContactBuilder, InfoBuilder, License, LicenseBuilder,
    OpenApiBuilder, Tag,
};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Router whose routes also make up the `OpenAPI` document.
///
/// Routes added outside of it (like `/` and `/openapi.json`) stay undocumented.
pub(crate) fn api_router() -> OpenApiRouter {
    OpenApiRouter::with_openapi(base_document())
        .routes(routes!(health::health))
        .routes(routes!(auth::register::register))
        .routes(routes!(auth::login::login))
        .routes(routes!(auth::session::logout))
}

// Info comes from Cargo.toml; the routes fill in the paths.
fn base_document() -> utoipa::openapi::OpenApi {
    let info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(non_empty(env!("CARGO_PKG_DESCRIPTION")))
        .contact(env!("CARGO_PKG_AUTHORS").split(':').find_map(author_contact))
        .license(non_empty(env!("CARGO_PKG_LICENSE")).map(spdx_license))
        .build();

    OpenApiBuilder::new().info(info).tags(Some(tags())).build()
}

fn tags() -> Vec<Tag> {
    [
        ("health", "Service and store health"),
        ("auth", "Registration, login and logout"),
    ]
    .into_iter()
    .map(|(name, description)| {
        TagBuilder::new()
            .name(name)
            .description(Some(description))
            .build()
    })
    .collect()
}

/// `Name <email>`, `Name` or `<email>` into a contact.
fn author_contact(author: &str) -> Option<Contact> {
    let (name, email) = match author.split_once('<') {
        Some((name, rest)) => (name, rest.trim_end().trim_end_matches('>')),
        None => (author, ""),
    };
    let (name, email) = (non_empty(name), non_empty(email));
    if name.is_none() && email.is_none() {
        return None;
    }
    Some(ContactBuilder::new().name(name).email(email).build())
}

fn spdx_license(identifier: &str) -> License {
    LicenseBuilder::new()
        .name(identifier)
        .identifier(Some(identifier))
        .build()
}

fn non_empty(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|value| !value.is_empty())
}
