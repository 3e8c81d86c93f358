//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the machine API. It registers:
//!
//! - **Paths**: the `/api/*.php` ingestion endpoints and health probes
//! - **Schemas**: domain type wrappers ([`ErrorSchema`], [`ErrorCodeSchema`])
//!   that provide OpenAPI definitions without coupling domain types to the
//!   utoipa framework
//! - **Security**: the per-user API token sent as a bearer header
//!
//! Page view-model endpoints are session-driven HTML surfaces and stay out
//! of the document. The generated specification is served by Swagger UI in
//! debug builds and exported via `cargo run --bin openapi-dump`.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the API token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "ApiToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some(
                        "Per-user API token shown on the settings page; may also be sent as `token` in the body.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the machine API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "MyTruckTracker API",
        description = "Endpoints called by the in-game job tracker plugin, plus health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::job_api::start_job,
        crate::inbound::http::job_api::finish_job,
        crate::inbound::http::job_api::record_toll,
        crate::inbound::http::job_api::record_fine,
        crate::inbound::http::job_api::record_transport,
        crate::inbound::http::job_api::claim_install,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "ingestion", description = "Job telemetry reported by the tracker plugin"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the registered paths and security scheme.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // Note: utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[rstest]
    #[case("/api/start_job.php")]
    #[case("/api/finish_job.php")]
    #[case("/api/record_toll.php")]
    #[case("/api/record_fine.php")]
    #[case("/api/record_transport.php")]
    #[case("/api/auth.php")]
    #[case("/health/ready")]
    fn every_machine_endpoint_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    fn post_operation(doc: &utoipa::openapi::OpenApi, path: &str) -> utoipa::openapi::path::Operation {
        doc.paths
            .paths
            .get(path)
            .and_then(|item| item.post.clone())
            .unwrap_or_else(|| panic!("missing POST {path}"))
    }

    #[rstest]
    #[case("/api/record_toll.php")]
    #[case("/api/record_fine.php")]
    fn penalty_reports_accept_json_and_forms(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        let body = post_operation(&doc, path)
            .request_body
            .expect("request body documented");
        let types: Vec<&str> = body.content.keys().map(String::as_str).collect();
        assert_eq!(types, ["application/json", "application/x-www-form-urlencoded"]);
    }

    #[rstest]
    #[case("/api/finish_job.php", "404")]
    #[case("/api/record_toll.php", "403")]
    #[case("/api/auth.php", "409")]
    fn error_responses_reference_the_error_schema(#[case] path: &str, #[case] status: &str) {
        let doc = ApiDoc::openapi();
        let operation = post_operation(&doc, path);
        let Some(RefOr::T(response)) = operation.responses.responses.get(status) else {
            panic!("{path} should document {status}");
        };
        let schema = response
            .content
            .get("application/json")
            .and_then(|content| content.schema.as_ref())
            .expect("json error body");
        match schema {
            RefOr::Ref(reference) => assert!(
                reference.ref_location.ends_with(ERROR_SCHEMA_NAME),
                "unexpected ref {}",
                reference.ref_location
            ),
            RefOr::T(_) => panic!("error body should reference the shared schema"),
        }
    }

    #[test]
    fn api_token_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let schemes = &doc
            .components
            .as_ref()
            .expect("components")
            .security_schemes;
        assert!(schemes.contains_key("ApiToken"));
    }
}
