use ntex::{
    http::Payload,
    web::{Error, FromRequest, HttpRequest},
};
use uuid::Uuid;

use crate::{consts, front::errors};

/// Caller authenticated by the gateway in front of the app.
///
/// The gateway sets the `x-user-id` header, requests without a valid user
/// id are rejected with [Unauthorized](errors::UserError::Unauthorized).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayUser {
    pub id: Uuid,
}

fn parse_gateway_user(header_value: Option<&str>) -> Result<GatewayUser, errors::UserError> {
    header_value
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
        .map(|id| GatewayUser { id })
        .ok_or(errors::UserError::Unauthorized)
}

impl<Err> FromRequest<Err> for GatewayUser {
    type Error = Error;

    fn from_request(
        req: &HttpRequest,
        _: &mut Payload,
    ) -> impl std::future::Future<Output = Result<Self, Self::Error>> {
        let header_value = req
            .headers()
            .get(consts::USER_ID_HEADER)
            .and_then(|v| v.to_str().ok());

        futures::future::ready(parse_gateway_user(header_value).map_err(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gateway_user() {
        let id = Uuid::new_v4();

        assert_eq!(
            parse_gateway_user(Some(&format!(" {id} "))).unwrap(),
            GatewayUser { id }
        );
        assert!(matches!(
            parse_gateway_user(Some("not-a-uuid")),
            Err(errors::UserError::Unauthorized)
        ));
        assert!(matches!(
            parse_gateway_user(None),
            Err(errors::UserError::Unauthorized)
        ));
    }
}
