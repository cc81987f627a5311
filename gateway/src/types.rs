//! Request and response types for the gateway REST client

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row filter applied to a table operation.
///
/// Filters translate into query-string pairs in the gateway's
/// `column=op.value` dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Match rows whose column equals the value
    Eq {
        /// Column name
        column: String,
        /// Value rendered into the query string
        value: String,
    },
    /// Match rows whose column is one of the values
    In {
        /// Column name
        column: String,
        /// Values rendered into the query string
        values: Vec<String>,
    },
}

impl Filter {
    /// Equality filter: `column=eq.value`
    pub fn eq(column: impl Into<String>, value: impl ToString) -> Self {
        Self::Eq {
            column: column.into(),
            value: value.to_string(),
        }
    }

    /// Membership filter: `column=in.(a,b,c)`
    pub fn is_in<V: ToString>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::In {
            column: column.into(),
            values: values.into_iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Render the filter as a query-string pair
    #[must_use]
    pub fn to_query_pair(&self) -> (String, String) {
        match self {
            Self::Eq { column, value } => (column.clone(), format!("eq.{value}")),
            Self::In { column, values } => {
                (column.clone(), format!("in.({})", values.join(",")))
            },
        }
    }
}

/// Result ordering for a select operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    column: String,
    ascending: bool,
}

impl OrderBy {
    /// Ascending order on a column
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    /// Descending order on a column
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }

    /// Render as the `order` query-string value
    #[must_use]
    pub fn to_query_value(&self) -> String {
        let direction = if self.ascending { "asc" } else { "desc" };
        format!("{}.{direction}", self.column)
    }
}

/// The authenticated principal as the auth service reports it.
///
/// Profile data (name, role) lives in the `users` collection; this type
/// only carries what the session endpoint returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Auth service user id (UUID)
    pub id: Uuid,
    /// Email address, when the auth service exposes it
    #[serde(default)]
    pub email: Option<String>,
}

/// A session issued by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for subsequent requests
    pub access_token: String,
    /// Token type, typically `bearer`
    #[serde(default)]
    pub token_type: Option<String>,
    /// Seconds until the access token expires
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Token used to mint a fresh access token
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// The user this session belongs to
    pub user: AuthUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_filter_renders_query_pair() {
        let filter = Filter::eq("event_id", 42);
        assert_eq!(
            filter.to_query_pair(),
            ("event_id".to_string(), "eq.42".to_string())
        );
    }

    #[test]
    fn in_filter_renders_parenthesized_list() {
        let filter = Filter::is_in("ticket_id", [1, 2, 3]);
        assert_eq!(
            filter.to_query_pair(),
            ("ticket_id".to_string(), "in.(1,2,3)".to_string())
        );
    }

    #[test]
    fn order_by_renders_direction() {
        assert_eq!(OrderBy::asc("date").to_query_value(), "date.asc");
        assert_eq!(OrderBy::desc("date").to_query_value(), "date.desc");
    }
}
