//! Caller identity as forwarded by the upstream identity provider gateway.
//!
//! Authentication itself happens before requests reach this service; the gateway
//! stamps the resolved company user and company onto every request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use serde::Serialize;
use uuid::Uuid;

use crate::error::PortalError;
use crate::ids::{CompanyId, IdentityId};

pub const IDENTITY_HEADER: &str = "x-identity-id";
pub const COMPANY_HEADER: &str = "x-company-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdentityData {
    pub identity_id: IdentityId,
    pub company_id: CompanyId,
}

impl IdentityData {
    pub fn new(identity_id: IdentityId, company_id: CompanyId) -> Self {
        Self {
            identity_id,
            company_id,
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Result<Self, PortalError> {
        let identity_id = header_uuid(headers, IDENTITY_HEADER)?;
        let company_id = header_uuid(headers, COMPANY_HEADER)?;
        Ok(Self::new(identity_id.into(), company_id.into()))
    }
}

fn header_uuid(headers: &HeaderMap, name: &str) -> Result<Uuid, PortalError> {
    let value = headers
        .get(name)
        .ok_or_else(|| PortalError::Unauthorized(format!("missing {name} header")))?;
    let raw = value
        .to_str()
        .map_err(|_| PortalError::Unauthorized(format!("{name} header is not valid ascii")))?;
    Uuid::parse_str(raw.trim())
        .map_err(|_| PortalError::Unauthorized(format!("{name} header must be a uuid")))
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for IdentityData
where
    S: Send + Sync,
{
    type Rejection = PortalError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn parses_both_headers() {
        let identity = Uuid::new_v4();
        let company = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            IDENTITY_HEADER,
            HeaderValue::from_str(&identity.to_string()).expect("header value"),
        );
        headers.insert(
            COMPANY_HEADER,
            HeaderValue::from_str(&company.to_string()).expect("header value"),
        );

        let data = IdentityData::from_headers(&headers).expect("identity parses");
        assert_eq!(data.identity_id, IdentityId(identity));
        assert_eq!(data.company_id, CompanyId(company));
    }

    #[test]
    fn missing_company_header_is_unauthorized() {
        let mut headers = HeaderMap::new();
        headers.insert(
            IDENTITY_HEADER,
            HeaderValue::from_str(&Uuid::new_v4().to_string()).expect("header value"),
        );

        match IdentityData::from_headers(&headers) {
            Err(PortalError::Unauthorized(message)) => assert!(message.contains(COMPANY_HEADER)),
            other => panic!("expected unauthorized, got {other:?}"),
        }
    }

    #[test]
    fn malformed_identity_header_is_unauthorized() {
        let mut headers = HeaderMap::new();
        headers.insert(IDENTITY_HEADER, HeaderValue::from_static("not-a-uuid"));
        headers.insert(
            COMPANY_HEADER,
            HeaderValue::from_str(&Uuid::new_v4().to_string()).expect("header value"),
        );

        assert!(matches!(
            IdentityData::from_headers(&headers),
            Err(PortalError::Unauthorized(_))
        ));
    }
}
