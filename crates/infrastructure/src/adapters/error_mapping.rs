//! Conversion of integration errors into `ApplicationError`

use application::error::ApplicationError;
use integration_directions::DirectionsError;
use integration_transit::TransitError;

/// Convert a transit integration error
///
/// A missing or rejected key becomes `CredentialMissing`, an empty result
/// `RouteNotFound`; everything else means the provider is unavailable.
#[must_use]
pub fn map_transit_error(provider: &str, error: TransitError) -> ApplicationError {
    match error {
        TransitError::MissingApiKey(_) => ApplicationError::CredentialMissing(provider.to_string()),
        TransitError::NoRoutesFound { from, to } => {
            ApplicationError::RouteNotFound(format!("{provider}: {from} -> {to}"))
        },
        TransitError::ConfigurationError(msg) => {
            ApplicationError::Configuration(format!("{provider}: {msg}"))
        },
        other => ApplicationError::ProviderUnavailable(format!("{provider}: {other}")),
    }
}

/// Convert a directions integration error
#[must_use]
pub fn map_directions_error(provider: &str, error: DirectionsError) -> ApplicationError {
    match error {
        DirectionsError::MissingApiKey(_) => {
            ApplicationError::CredentialMissing(provider.to_string())
        },
        DirectionsError::NoRoute(reason) => {
            ApplicationError::RouteNotFound(format!("{provider}: {reason}"))
        },
        DirectionsError::ConfigurationError(msg) => {
            ApplicationError::Configuration(format!("{provider}: {msg}"))
        },
        other => ApplicationError::ProviderUnavailable(format!("{provider}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use integration_transit::LatLng;

    use super::*;

    #[test]
    fn transit_errors() {
        assert_eq!(
            map_transit_error("google_routes", TransitError::MissingApiKey("x".into())),
            ApplicationError::CredentialMissing("google_routes".into())
        );
        assert!(matches!(
            map_transit_error(
                "google_routes",
                TransitError::NoRoutesFound {
                    from: LatLng::new(37.5665, 126.978),
                    to: LatLng::new(37.5796, 126.999),
                }
            ),
            ApplicationError::RouteNotFound(_)
        ));
        let err = map_transit_error("kakao-local", TransitError::Timeout { timeout_secs: 5 });
        assert!(
            matches!(err, ApplicationError::ProviderUnavailable(ref m) if m.starts_with("kakao-local"))
        );
        assert!(err.triggers_fallback());
        assert!(matches!(
            map_transit_error("google_routes", TransitError::QuotaExhausted),
            ApplicationError::ProviderUnavailable(_)
        ));
    }

    #[test]
    fn directions_errors() {
        assert_eq!(
            map_directions_error("kakao", DirectionsError::MissingApiKey("401".into())),
            ApplicationError::CredentialMissing("kakao".into())
        );
        assert!(matches!(
            map_directions_error("osrm", DirectionsError::NoRoute("NoRoute".into())),
            ApplicationError::RouteNotFound(_)
        ));
        assert!(matches!(
            map_directions_error("kakao", DirectionsError::MalformedResponse("eof".into())),
            ApplicationError::ProviderUnavailable(_)
        ));
        assert!(matches!(
            map_directions_error("osrm", DirectionsError::ConfigurationError("profile".into())),
            ApplicationError::Configuration(_)
        ));
    }
}
