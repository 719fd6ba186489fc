//! End-to-end flow: session token → route guard → cached access control.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::get,
    Router,
};
use homexpert_access::{AccessControl, ManualClock, MemoryRoleStore, PermissionCache, RoleStore};
use homexpert_auth::{route_guard, GuardConfig, GuardDecision, JwtService, RoleClaim, RouteGuard};
use homexpert_rbac::{Action, Permission, PermissionRecord, Role};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const SECRET: &str = "integration-test-secret-minimum-32-chars";

struct Fixture {
    jwt: Arc<JwtService>,
    store: Arc<MemoryRoleStore>,
    clock: Arc<ManualClock>,
    access: AccessControl,
    guard: Arc<RouteGuard>,
}

async fn fixture() -> Fixture {
    let store = Arc::new(MemoryRoleStore::new());
    for (id, permission) in [
        ("p-vendors-view", Permission::new("vendors", Action::View, "vendors")),
        ("p-leads-view", Permission::new("leads", Action::View, "leads")),
        ("p-roles-update", Permission::new("roles", Action::Update, "roles")),
        ("p-all", Permission::wildcard("system")),
    ] {
        store.insert_permission(PermissionRecord::new(id, permission)).await.unwrap();
    }

    store
        .insert_role(Role::new("r-admin", "Admin").with_permissions(["p-all"]).system())
        .await
        .unwrap();
    store
        .insert_role(Role::new("r-tele", "Telecaller").with_permissions(["p-leads-view"]))
        .await
        .unwrap();

    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let cache = Arc::new(PermissionCache::with_clock(Duration::from_secs(300), clock.clone()));
    let access = AccessControl::new(store.clone(), cache);

    let jwt = Arc::new(JwtService::with_secret(SECRET).unwrap());
    let config = GuardConfig::default()
        .with_section("/admin/vendors", "vendors.view")
        .and_then(|c| c.with_section("/admin/leads", "leads.view"))
        .and_then(|c| c.with_section("/admin/roles", "roles.update"))
        .unwrap();
    let guard = Arc::new(RouteGuard::new(config, jwt.clone()).with_access_control(access.clone()));

    Fixture {
        jwt,
        store,
        clock,
        access,
        guard,
    }
}

fn app(guard: Arc<RouteGuard>) -> Router {
    Router::new()
        .route("/admin/vendors", get(|| async { "vendors" }))
        .route("/admin/vendors/{id}", get(|| async { "vendor" }))
        .route("/admin/leads", get(|| async { "leads" }))
        .route("/admin/roles", get(|| async { "roles" }))
        .route("/auth/admin-login", get(|| async { "login" }))
        .layer(axum::middleware::from_fn_with_state(guard, route_guard))
}

fn request(uri: &str, cookie_token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = cookie_token {
        builder = builder.header(header::COOKIE, format!("homexpert.session-token={}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn location(app: Router, req: Request<Body>) -> Option<String> {
    let response = app.oneshot(req).await.unwrap();
    if response.status() == StatusCode::FOUND {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    } else {
        assert_eq!(response.status(), StatusCode::OK);
        None
    }
}

#[tokio::test]
async fn test_telecaller_sees_only_granted_sections() {
    let f = fixture().await;
    let token = f
        .jwt
        .issue_session("u-tele", RoleClaim::with_id("Telecaller", "r-tele"))
        .unwrap();

    assert_eq!(location(app(f.guard.clone()), request("/admin/leads", Some(&token))).await, None);
    assert_eq!(
        location(app(f.guard.clone()), request("/admin/vendors", Some(&token))).await,
        Some("/unauthorized".to_string())
    );
}

#[tokio::test]
async fn test_wildcard_admin_passes_everywhere() {
    let f = fixture().await;
    let token = f.jwt.issue_session("u-admin", RoleClaim::with_id("admin", "r-admin")).unwrap();

    for path in ["/admin/vendors", "/admin/leads", "/admin/roles"] {
        assert_eq!(location(app(f.guard.clone()), request(path, Some(&token))).await, None);
    }
}

#[tokio::test]
async fn test_login_flow_redirects() {
    let f = fixture().await;

    assert_eq!(
        location(app(f.guard.clone()), request("/admin/roles?tab=edit", None)).await,
        Some("/auth/admin-login?callbackUrl=%2Fadmin%2Froles%3Ftab%3Dedit".to_string())
    );

    let token = f.jwt.issue_session("u-admin", RoleClaim::name("admin")).unwrap();
    assert_eq!(
        location(app(f.guard.clone()), request("/auth/admin-login", Some(&token))).await,
        Some("/admin/dashboard".to_string())
    );
}

#[tokio::test]
async fn test_dotted_admin_path_is_not_treated_as_asset() {
    let f = fixture().await;

    assert_eq!(
        location(app(f.guard.clone()), request("/admin/vendors/jane.doe", None)).await,
        Some("/auth/admin-login?callbackUrl=%2Fadmin%2Fvendors%2Fjane.doe".to_string())
    );

    let token = f
        .jwt
        .issue_session("u-tele", RoleClaim::with_id("telecaller", "r-tele"))
        .unwrap();
    assert_eq!(
        location(app(f.guard.clone()), request("/admin/vendors/jane.doe", Some(&token))).await,
        Some("/unauthorized".to_string())
    );
}

#[tokio::test]
async fn test_grant_takes_effect_immediately() {
    let f = fixture().await;

    let decide = |token: String| {
        let guard = f.guard.clone();
        async move {
            let session = guard.session(&{
                let mut headers = axum::http::HeaderMap::new();
                headers.insert(header::AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());
                headers
            });
            guard.decide("/admin/vendors", None, session.as_ref()).await
        }
    };

    let token = f
        .jwt
        .issue_session("u-tele", RoleClaim::with_id("telecaller", "r-tele"))
        .unwrap();
    assert_eq!(decide(token.clone()).await, GuardDecision::Redirect("/unauthorized".into()));

    f.access.grant("r-tele", "p-vendors-view").await.unwrap();
    assert_eq!(decide(token).await, GuardDecision::Continue);
}

#[tokio::test]
async fn test_out_of_band_edit_heals_after_ttl() {
    let f = fixture().await;
    let token = f
        .jwt
        .issue_session("u-tele", RoleClaim::with_id("telecaller", "r-tele"))
        .unwrap();

    assert!(location(app(f.guard.clone()), request("/admin/vendors", Some(&token)))
        .await
        .is_some());

    // Another instance edits the role directly in the store
    f.store
        .set_role_permissions("r-tele", vec!["p-leads-view".into(), "p-vendors-view".into()])
        .await
        .unwrap();
    assert!(location(app(f.guard.clone()), request("/admin/vendors", Some(&token)))
        .await
        .is_some());

    f.clock.advance(Duration::from_secs(300));
    assert_eq!(location(app(f.guard.clone()), request("/admin/vendors", Some(&token))).await, None);
}
