use crate::{
    obs::{self, MetricsEvent},
    predicate::{CompiledQuery, IdField, Predicate},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error as ThisError;
use uuid::Uuid;

///
/// SecurityError
///
/// Malformed authorization input is fatal for the request. There is no
/// permissive fallback: a bad overlay never degrades to allow-all.
///

#[derive(Debug, ThisError)]
pub enum SecurityError {
    #[error("parent link field name is empty")]
    EmptyParentLink,
}

///
/// SecurityFilter
///
/// The authorization collaborator's decision for one (caller, resource,
/// action) triple. Opaque trusted input; this module only translates it
/// into predicate form.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityFilter {
    /// Objects the caller may see when `only_specific_allowed` is set.
    pub allowed: BTreeSet<Uuid>,
    /// Objects explicitly withheld regardless of other grants.
    pub denied: BTreeSet<Uuid>,
    /// When set, access is restricted to the allow-list; otherwise the
    /// caller sees everything outside the deny-list.
    pub only_specific_allowed: bool,
    /// Scope membership on this column instead of the object's own id,
    /// for resources authorized through their parent object.
    pub parent_link: Option<String>,
}

impl SecurityFilter {
    /// Unrestricted access with no exclusions.
    #[must_use]
    pub fn permit_all() -> Self {
        Self::default()
    }

    /// Translate the filter into predicate form.
    ///
    /// Restricted access scopes to the allow-list with denials subtracted;
    /// an empty remainder matches no rows. Unrestricted access subtracts
    /// the deny-list only.
    pub fn predicate(&self) -> Result<Predicate, SecurityError> {
        let field = match &self.parent_link {
            Some(column) if column.is_empty() => return Err(SecurityError::EmptyParentLink),
            Some(column) => IdField::ParentLink(column.clone()),
            None => IdField::OwnId,
        };

        if self.only_specific_allowed {
            let remaining: Vec<Uuid> = self
                .allowed
                .difference(&self.denied)
                .copied()
                .collect();

            // "Nothing allowed" must never degrade to "everything allowed".
            if remaining.is_empty() {
                return Ok(Predicate::False);
            }

            return Ok(Predicate::InIds {
                field,
                ids: remaining,
            });
        }

        if self.denied.is_empty() {
            return Ok(Predicate::True);
        }

        Ok(Predicate::not(Predicate::InIds {
            field,
            ids: self.denied.iter().copied().collect(),
        }))
    }

    /// AND the overlay onto a compiled query.
    pub fn apply(&self, query: &CompiledQuery) -> Result<CompiledQuery, SecurityError> {
        let overlay = self.predicate()?;
        let combined = crate::predicate::normalize(&Predicate::And(vec![
            query.predicate.clone(),
            overlay,
        ]));

        obs::record(MetricsEvent::SecurityApplied);

        Ok(CompiledQuery::new(query.root, combined))
    }
}

///
/// TESTS
///
