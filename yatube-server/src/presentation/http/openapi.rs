use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::handlers::api::{CreateGroupDto, GroupDto, PostDto, PostPageDto};
use crate::presentation::http::handlers::auth::{AuthResponseDto, LoginDto, RegisterDto, UserDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::auth::register,
        crate::presentation::http::handlers::auth::login,
        crate::presentation::http::handlers::api::list_posts,
        crate::presentation::http::handlers::api::get_post,
        crate::presentation::http::handlers::api::list_groups,
        crate::presentation::http::handlers::api::create_group
    ),
    components(
        schemas(
            RegisterDto,
            LoginDto,
            AuthResponseDto,
            UserDto,
            PostDto,
            PostPageDto,
            GroupDto,
            CreateGroupDto
        )
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "posts", description = "Read-only post feed"),
        (name = "groups", description = "Post groups")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
