use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::models::{Classroom, CreateClassroom, GroupDetail, ImportReport, NewClassroom, Student};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .build(),
            ),
        );
        components.add_security_scheme(
            "query_token",
            SecurityScheme::ApiKey(ApiKey::Query(ApiKeyValue::new("token"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::list_groups,
        crate::handlers::create_group,
        crate::handlers::get_group,
        crate::handlers::delete_group,
        crate::handlers::import_groups,
        crate::handlers::download_template
    ),
    components(schemas(Classroom, CreateClassroom, NewClassroom, Student, GroupDetail, ImportReport)),
    tags(
        (name = "groups", description = "Classroom group management"),
        (name = "import", description = "Bulk CSV import"),
        (name = "health", description = "Service health probes")
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;
