//! User endpoint

use super::Api;
use crate::context::RequestContext;
use crate::error::Result;
use crate::http::RequestConfig;
use crate::types::Method;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The account owner behind the active credentials
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    /// User identifier
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub zipcode: Option<String>,
    #[serde(default)]
    pub two_factor_authentication_enabled: bool,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub suspended: bool,
}

impl Api {
    /// Fetch details of the current user (`GET /user`)
    pub async fn user_details(&self, ctx: &RequestContext) -> Result<User> {
        self.request_envelope::<User>(ctx, Method::GET, "/user", RequestConfig::new())
            .await?
            .into_result()
    }
}
