//! Canonical URL resolution for catalog pages.
//!
//! The slug in an incoming URL is only a hint: the catalog id decides what is
//! shown, and any slug that no longer matches the current title is answered
//! with a redirect to the canonical path.

use crate::{
    core::slug,
    error::{AppError, AppResult},
    models::{CatalogTitle, MediaType, Person},
    services::catalog::{lookup_title, CatalogProvider},
};

/// Outcome of resolving a slugged catalog URL
#[derive(Debug, Clone, PartialEq)]
pub enum Canonical<T> {
    /// The requested slug is current
    Current(T),
    /// The requested slug is stale; redirect to this path
    Redirect(String),
}

/// Resolves `/movie/{id}/{slug}` or `/tv/{id}/{slug}`
pub async fn resolve_title(
    catalog: &dyn CatalogProvider,
    media_type: MediaType,
    id: u64,
    requested_slug: &str,
) -> AppResult<Canonical<CatalogTitle>> {
    let title = lookup_title(catalog, media_type, id).await?;

    if slug::encode(&title.title) == requested_slug {
        Ok(Canonical::Current(title))
    } else {
        let path = title.canonical_path();
        tracing::debug!(
            media_type = %media_type,
            id = id,
            requested = %requested_slug,
            canonical = %path,
            "Redirecting stale slug"
        );
        Ok(Canonical::Redirect(path))
    }
}

/// Resolves `/person/{id}-{slug}`; an unparseable id is `NotFound`
pub async fn resolve_person(
    catalog: &dyn CatalogProvider,
    requested: &str,
) -> AppResult<Canonical<Person>> {
    let id = slug::decode_person_id(requested)
        .ok_or_else(|| AppError::NotFound(format!("person {}", requested)))?;
    let person = catalog.person(id).await?;

    if slug::encode_person_slug(person.id, &person.name) == requested {
        Ok(Canonical::Current(person))
    } else {
        Ok(Canonical::Redirect(slug::person_path(person.id, &person.name)))
    }
}
