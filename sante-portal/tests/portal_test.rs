//! End-to-end tests against a mock backend
//!
//! An axum app stands in for the REST API; the portal drives it through its
//! real HTTP client.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use sante_core::{paths, ChatRole, Credentials, Decision, GeoPoint, Role, View};
use sante_portal::config::PortalConfig;
use sante_portal::error::{AuthError, PortalError};
use sante_portal::Portal;
use sante_store::{keys, KeyValueStore, MemoryStore};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct Backend {
    enter_calls: AtomicUsize,
    staff_lookups: AtomicUsize,
}

type Shared = Arc<Backend>;

/// Delay of the deliberately slow endpoints
const SLOW_REPLY: Duration = Duration::from_millis(300);

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match (username, password) {
        ("amina", "secret") => reply(
            StatusCode::OK,
            json!({"access": "tok-amina", "refresh": "ref-amina"}),
        ),
        ("staff1", "secret") => reply(StatusCode::OK, json!({"access": "tok-staff1"})),
        ("staff2", "secret") => reply(StatusCode::OK, json!({"access": "tok-staff2"})),
        ("lento", "secret") => reply(StatusCode::OK, json!({"access": "tok-lento"})),
        ("legacy", "secret") => reply(
            StatusCode::OK,
            json!({"token": "tok-legacy", "user": {"username": "legacy", "role": "doctor"}}),
        ),
        _ => reply(
            StatusCode::UNAUTHORIZED,
            json!({"error": "Identifiants incorrects"}),
        ),
    }
}

async fn profile(headers: HeaderMap) -> Response {
    match bearer(&headers).as_deref() {
        Some("tok-amina") | Some("tok-refreshed") => reply(
            StatusCode::OK,
            json!({"_id": "u1", "username": "amina", "first_name": "Amina", "role": "patient"}),
        ),
        Some("tok-staff1") => reply(
            StatusCode::OK,
            json!({"_id": "u2", "username": "staff1", "role": "clinic_staff"}),
        ),
        // Linked to no clinic
        Some("tok-staff2") => reply(
            StatusCode::OK,
            json!({"_id": "u3", "username": "staff2", "role": "clinic_staff"}),
        ),
        Some("tok-lento") => {
            tokio::time::sleep(SLOW_REPLY).await;
            reply(
                StatusCode::OK,
                json!({"_id": "u4", "username": "lento", "role": "patient"}),
            )
        }
        Some("expired") => reply(StatusCode::UNAUTHORIZED, json!({"detail": "Token expired"})),
        _ => reply(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "boom"})),
    }
}

async fn update_profile(headers: HeaderMap, Json(patch): Json<Value>) -> Response {
    if bearer(&headers).as_deref() != Some("tok-amina") {
        return reply(StatusCode::UNAUTHORIZED, json!({"detail": "no"}));
    }
    reply(
        StatusCode::OK,
        json!({"username": "amina", "role": "patient", "phone": patch["phone"]}),
    )
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["username"] == "amina" {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({"error": "Username already taken"}),
        );
    }
    reply(StatusCode::CREATED, json!({"message": "ok"}))
}

async fn refresh(Json(body): Json<Value>) -> Response {
    if body["refresh"] == "ref-amina" {
        reply(StatusCode::OK, json!({"access": "tok-refreshed"}))
    } else {
        reply(StatusCode::UNAUTHORIZED, json!({"detail": "bad refresh"}))
    }
}

async fn enter_clinic(State(backend): State<Shared>, Path(id): Path<String>) -> Response {
    backend.enter_calls.fetch_add(1, Ordering::SeqCst);
    if id == "slow" {
        tokio::time::sleep(SLOW_REPLY).await;
        return reply(StatusCode::OK, json!({"id": "slow", "name": "Clinique Lente"}));
    }
    if id != "c1" {
        return reply(StatusCode::NOT_FOUND, json!({"error": "Clinic not found"}));
    }
    reply(
        StatusCode::OK,
        json!({
            "id": "c1",
            "name": "Clinique El Manar",
            "logo": "/el-manar.png",
            "primaryColor": "#0ea5e9",
            "secondaryColor": "#06b6d4"
        }),
    )
}

async fn staff_clinic(State(backend): State<Shared>, Path(username): Path<String>) -> Response {
    backend.staff_lookups.fetch_add(1, Ordering::SeqCst);
    if username != "staff1" {
        return reply(StatusCode::NOT_FOUND, json!({"error": "No clinic"}));
    }
    reply(
        StatusCode::OK,
        json!({"_id": "c2", "name": "Clinique Pasteur", "primary_color": "#7c3aed"}),
    )
}

async fn clinics() -> Response {
    reply(
        StatusCode::OK,
        json!({"clinics": [
            {"id": "far", "name": "Far", "latitude": 36.0, "longitude": 10.0, "rating": 4.9},
            {"id": "near", "name": "Near", "latitude": 36.80, "longitude": 10.18, "rating": 3.0},
            {"id": "mid", "name": "Mid", "latitude": 36.5, "longitude": 10.1, "rating": 4.1}
        ]}),
    )
}

async fn stats() -> Response {
    reply(
        StatusCode::OK,
        json!({"summary": {"glucose": {"avg": 1.05, "min": 0.9, "max": 1.3}}, "series": {}}),
    )
}

async fn patient_lab_orders() -> Response {
    reply(
        StatusCode::OK,
        json!({"orders": [
            {"_id": "o1", "test_name": "NFS", "status": "pending", "ordered_at": "2025-02-01T08:00:00Z"},
            {"_id": "o2", "test_name": "CRP", "status": "completed"}
        ]}),
    )
}

async fn doctors_list() -> Response {
    reply(
        StatusCode::OK,
        json!([
            {"username": "dr_a", "role": "doctor", "rating": 4.2},
            {"username": "dr_b", "role": "doctor", "rating": 4.9},
            {"username": "dr_c", "role": "doctor"},
            {"username": "dr_d", "role": "doctor", "rating": 3.1}
        ]),
    )
}

async fn chat_history() -> Response {
    reply(StatusCode::OK, json!([]))
}

async fn chat(Json(body): Json<Value>) -> Response {
    if body["message"] == "fail" {
        return reply(StatusCode::SERVICE_UNAVAILABLE, json!({"error": "down"}));
    }
    let stream = concat!(
        "data: {\"content\":\"Bon\"}\n\n",
        ": keep-alive\n\n",
        "data: {\"content\":\"jour\"}\n\n",
        "data: [DONE]\n\n",
        "data: {\"content\":\"ignored\"}\n\n",
    );
    ([(header::CONTENT_TYPE, "text/event-stream")], stream).into_response()
}

async fn delete_document(Path(_id): Path<String>) -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Start the mock backend on a random port, returns the API base URL
async fn start_backend() -> (String, Shared) {
    let backend = Shared::default();
    let api = Router::new()
        .route("/auth/login/", post(login))
        .route("/auth/register/", post(register))
        .route("/auth/profile/", get(profile).patch(update_profile))
        .route("/auth/refresh/", post(refresh))
        .route("/auth/doctors/list/", get(doctors_list))
        .route("/clinics/", get(clinics))
        .route("/clinics/{id}/enter/", post(enter_clinic))
        .route("/clinics/staff/{username}/clinic/", get(staff_clinic))
        .route("/records/stats/", get(stats))
        .route("/lab-orders/patient/", get(patient_lab_orders))
        .route("/chat/", post(chat))
        .route("/chat/history/", get(chat_history))
        .route("/patient/document/{id}/", delete(delete_document))
        .with_state(backend.clone());
    let app = Router::new().nest("/api", api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api", addr), backend)
}

fn portal_for(base_url: &str, store: Arc<MemoryStore>) -> Portal {
    Portal::with_store(PortalConfig::for_api(base_url), store)
}

async fn signed_in_patient() -> (Portal, Arc<MemoryStore>, Shared) {
    let (base_url, backend) = start_backend().await;
    let store = Arc::new(MemoryStore::new());
    let portal = portal_for(&base_url, store.clone());
    portal
        .login(&Credentials::new("amina", "secret"))
        .await
        .unwrap();
    (portal, store, backend)
}

#[tokio::test]
async fn test_login_sets_token_and_role() {
    let (portal, store, _backend) = signed_in_patient().await;

    let snapshot = portal.session().snapshot();
    assert!(snapshot.authenticated);
    assert!(!snapshot.loading);
    assert_eq!(snapshot.role, Some(Role::Patient));
    assert_eq!(snapshot.username(), Some("amina"));
    assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("tok-amina"));
    assert_eq!(store.get(keys::REFRESH_TOKEN).unwrap().as_deref(), Some("ref-amina"));
    assert_eq!(store.get(keys::USER_ROLE).unwrap().as_deref(), Some("patient"));

    let refreshed = portal.session().refresh_profile().await.unwrap().unwrap();
    assert_eq!(refreshed.role, Role::Patient);
    assert_eq!(refreshed.display_name(), "Amina");
}

#[tokio::test]
async fn test_login_rejected() {
    let (base_url, _backend) = start_backend().await;
    let portal = portal_for(&base_url, Arc::new(MemoryStore::new()));

    let err = portal
        .login(&Credentials::new("amina", "wrong"))
        .await
        .unwrap_err();
    match err {
        PortalError::Auth(AuthError::Rejected { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Identifiants incorrects");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!portal.session().is_authenticated());
}

#[tokio::test]
async fn test_login_falls_back_to_embedded_user() {
    let (base_url, _backend) = start_backend().await;
    let portal = portal_for(&base_url, Arc::new(MemoryStore::new()));

    let user = portal
        .login(&Credentials::new("legacy", "secret"))
        .await
        .unwrap();
    assert_eq!(user.role, Role::Doctor);
    assert_eq!(portal.api().token().as_deref(), Some("tok-legacy"));
    assert_eq!(
        portal.navigate("/v1/portal/admin/users"),
        Decision::Redirect(paths::DOCTOR_DASHBOARD)
    );
}

#[tokio::test]
async fn test_register_then_duplicate() {
    let (base_url, _backend) = start_backend().await;
    let portal = portal_for(&base_url, Arc::new(MemoryStore::new()));

    // The mock only knows how to sign in "staff1" after registering it
    let registration = sante_core::Registration::new("staff1", "secret");
    let user = portal.register(&registration).await.unwrap();
    assert_eq!(user.role, Role::ClinicStaff);

    portal.logout().unwrap();
    let taken = sante_core::Registration::new("amina", "secret");
    let err = portal.register(&taken).await.unwrap_err();
    assert!(matches!(
        err,
        PortalError::Auth(AuthError::Rejected { status: 400, .. })
    ));
}

#[tokio::test]
async fn test_logout_then_protected_redirects_to_login() {
    let (portal, store, _backend) = signed_in_patient().await;
    portal.enter_clinic(Some("c1")).await.unwrap();

    portal.logout().unwrap();

    let snapshot = portal.session().snapshot();
    assert!(!snapshot.authenticated);
    assert_eq!(snapshot.role, None);
    assert!(snapshot.user.is_none());
    assert!(portal.api().token().is_none());
    assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap(), None);
    assert_eq!(store.get(keys::CURRENT_CLINIC).unwrap(), None);
    assert!(!portal.theme().is_branded());
    assert_eq!(
        portal.navigate("/dashboard"),
        Decision::Redirect(paths::LOGIN)
    );
}

#[tokio::test]
async fn test_enter_without_id_is_noop() {
    let (portal, _store, backend) = signed_in_patient().await;

    for id in [None, Some(""), Some("undefined")] {
        assert!(portal.enter_clinic(id).await.unwrap().is_none());
    }
    assert_eq!(backend.enter_calls.load(Ordering::SeqCst), 0);

    portal.enter_clinic(Some("c1")).await.unwrap();
    for id in [None, Some(""), Some("undefined")] {
        let kept = portal.enter_clinic(id).await.unwrap().unwrap();
        assert_eq!(kept.id, "c1");
    }
    assert_eq!(backend.enter_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_enter_clinic_brands_theme_and_redirects() {
    let (portal, store, _backend) = signed_in_patient().await;

    match portal.navigate("/dashboard") {
        Decision::Render(entry) => assert_eq!(entry.view, View::PatientDashboard),
        other => panic!("expected render, got {:?}", other),
    }
    assert_eq!(
        portal.navigate("/clinic/patient/book"),
        Decision::Redirect(paths::PATIENT_DASHBOARD)
    );

    let mut themes = portal.clinic().subscribe_theme();
    let clinic = portal.enter_clinic(Some("c1")).await.unwrap().unwrap();
    assert_eq!(clinic.rating, 4.5);
    assert_eq!(clinic.logo_url, "/el-manar.png");
    assert!(themes.has_changed().unwrap());

    let theme = themes.borrow_and_update().clone();
    assert_eq!(theme.primary.as_deref(), Some("#0ea5e9"));
    assert_eq!(theme.accent.as_deref(), Some("#06b6d4"));
    assert_eq!(theme.title, "Clinique El Manar - Dawini");
    assert!(store.get(keys::CURRENT_CLINIC).unwrap().is_some());

    assert_eq!(
        portal.navigate("/dashboard"),
        Decision::Redirect(paths::CLINIC_PATIENT_DASHBOARD)
    );
    assert_eq!(
        portal.navigate("/dashboard/clinics/recommended"),
        Decision::Redirect(paths::CLINIC_PATIENT_DASHBOARD)
    );
    assert_eq!(
        portal.navigate("/clinic/patient/book").view(),
        Some(View::ClinicBooking)
    );
    assert!(portal.sidebar().iter().any(|l| l.path.starts_with("/clinic/patient")));

    portal.exit_clinic().unwrap();
    let theme = portal.theme();
    assert!(!theme.is_branded());
    assert!(theme.css_properties().is_empty());
    assert_eq!(theme.title, "Dawini Santé");
}

#[tokio::test]
async fn test_enter_unknown_clinic_keeps_tenancy() {
    let (portal, _store, _backend) = signed_in_patient().await;
    portal.enter_clinic(Some("c1")).await.unwrap();

    let err = portal.enter_clinic(Some("c404")).await.unwrap_err();
    match err {
        PortalError::Api(api) => {
            assert!(api.is_not_found());
            assert_eq!(api.message(), "Clinic not found");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(portal.clinic().clinic_id().as_deref(), Some("c1"));
}

#[tokio::test]
async fn test_staff_clinic_resolved_on_load() {
    let (base_url, backend) = start_backend().await;
    let store = Arc::new(MemoryStore::new());
    store.set(keys::ACCESS_TOKEN, "tok-staff1").unwrap();

    let portal = portal_for(&base_url, store);
    let snapshot = portal.load().await.unwrap();
    assert_eq!(snapshot.role, Some(Role::ClinicStaff));

    let clinic = portal.clinic().current().unwrap();
    assert_eq!(clinic.id, "c2");
    assert_eq!(clinic.rating, 4.8);
    assert_eq!(clinic.secondary_color.as_deref(), Some("#7c3aed"));
    assert_eq!(backend.enter_calls.load(Ordering::SeqCst), 0);
    assert_eq!(portal.theme().accent.as_deref(), Some("#7c3aed"));

    match portal.navigate("/clinic/dashboard") {
        Decision::Render(entry) => assert_eq!(entry.view, View::StaffDashboard),
        other => panic!("expected render, got {:?}", other),
    }
    assert_eq!(
        portal.navigate("/dashboard"),
        Decision::Redirect(paths::CLINIC_DASHBOARD)
    );
}

#[tokio::test]
async fn test_staff_without_clinic_stays_unscoped() {
    let (base_url, backend) = start_backend().await;
    let store = Arc::new(MemoryStore::new());
    store.set(keys::ACCESS_TOKEN, "tok-staff2").unwrap();

    let portal = portal_for(&base_url, store.clone());
    let snapshot = portal.load().await.unwrap();
    assert_eq!(snapshot.role, Some(Role::ClinicStaff));
    assert_eq!(snapshot.username(), Some("staff2"));

    assert_eq!(backend.staff_lookups.load(Ordering::SeqCst), 1);
    assert!(portal.clinic().current().is_none());
    assert!(!portal.theme().is_branded());
    assert_eq!(store.get(keys::CURRENT_CLINIC).unwrap(), None);
}

#[tokio::test]
async fn test_background_resolver_follows_session() {
    let (base_url, backend) = start_backend().await;
    let portal = portal_for(&base_url, Arc::new(MemoryStore::new()));
    let resolver = portal.spawn_staff_resolver();
    let mut themes = portal.clinic().subscribe_theme();

    portal.session().login(&Credentials::new("staff1", "secret")).await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), themes.wait_for(|t| t.is_branded()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(portal.clinic().clinic_id().as_deref(), Some("c2"));

    portal.session().logout();
    tokio::time::timeout(Duration::from_secs(5), themes.wait_for(|t| !t.is_branded()))
        .await
        .unwrap()
        .unwrap();
    assert!(portal.clinic().current().is_none());
    assert_eq!(backend.staff_lookups.load(Ordering::SeqCst), 1);

    resolver.abort();
}

#[tokio::test]
async fn test_expired_token_logs_out_on_load() {
    let (base_url, _backend) = start_backend().await;
    let store = Arc::new(MemoryStore::new());
    store.set(keys::ACCESS_TOKEN, "expired").unwrap();
    store.set(keys::USER_ROLE, "patient").unwrap();

    let portal = portal_for(&base_url, store.clone());
    assert_eq!(
        portal.session().restore().unwrap().navigation(false).role,
        Some(Role::Patient)
    );

    let snapshot = portal.load().await.unwrap();
    assert!(!snapshot.authenticated);
    assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap(), None);
    assert_eq!(portal.navigate("/dashboard"), Decision::Redirect(paths::LOGIN));
}

#[tokio::test]
async fn test_unauthorized_policy_can_keep_session() {
    let (base_url, _backend) = start_backend().await;
    let store = Arc::new(MemoryStore::new());
    store.set(keys::ACCESS_TOKEN, "expired").unwrap();
    store.set(keys::USER_ROLE, "patient").unwrap();

    let mut config = PortalConfig::for_api(&base_url);
    config.session.logout_on_unauthorized = false;
    let portal = Portal::with_store(config, store);

    let snapshot = portal.load().await.unwrap();
    assert!(snapshot.authenticated);
    assert!(!snapshot.loading);
    assert_eq!(snapshot.role, Some(Role::Patient));
}

#[tokio::test]
async fn test_server_error_keeps_session() {
    let (base_url, _backend) = start_backend().await;
    let store = Arc::new(MemoryStore::new());
    store.set(keys::ACCESS_TOKEN, "flaky").unwrap();
    store.set(keys::USER_ROLE, "doctor").unwrap();

    let portal = portal_for(&base_url, store.clone());
    let snapshot = portal.load().await.unwrap();
    assert!(snapshot.authenticated);
    assert_eq!(snapshot.role, Some(Role::Doctor));
    assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("flaky"));
    assert_eq!(
        portal.navigate("/doctor/patients").view(),
        Some(View::DoctorPatients)
    );
}

#[tokio::test]
async fn test_refresh_access_token() {
    let (portal, store, _backend) = signed_in_patient().await;

    portal.session().refresh_access_token().await.unwrap();
    assert_eq!(portal.api().token().as_deref(), Some("tok-refreshed"));
    assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("tok-refreshed"));
    // The refresh token was not rotated
    assert_eq!(store.get(keys::REFRESH_TOKEN).unwrap().as_deref(), Some("ref-amina"));
    assert!(portal.session().refresh_profile().await.unwrap().is_some());
}

#[tokio::test]
async fn test_update_profile() {
    let (portal, _store, _backend) = signed_in_patient().await;

    let user = portal
        .session()
        .update_profile(&json!({"phone": "+216 20 000 000"}))
        .await
        .unwrap();
    assert_eq!(user.phone.as_deref(), Some("+216 20 000 000"));
    assert_eq!(portal.session().user(), Some(user));
}

#[tokio::test]
async fn test_chat_streams_reply() {
    let (portal, _store, _backend) = signed_in_patient().await;
    let chat = portal.chat();

    let mut transcript = chat.history().await;
    assert_eq!(transcript.messages().len(), 1);
    assert_eq!(transcript.messages()[0].role, ChatRole::Assistant);

    let mut seen = Vec::new();
    chat.send_with(&mut transcript, "Bonjour", "amina", |d| seen.push(d.to_string()))
        .await
        .unwrap();
    assert_eq!(seen, vec!["Bon", "jour"]);

    let reply = transcript.last_reply().unwrap();
    assert_eq!(reply.role, ChatRole::Assistant);
    assert_eq!(reply.content, "Bonjour");
    assert_eq!(transcript.messages().len(), 3);
}

#[tokio::test]
async fn test_chat_failure_shows_unavailable() {
    let (portal, _store, _backend) = signed_in_patient().await;
    let chat = portal.chat();

    let mut transcript = chat.history().await;
    let err = chat.send(&mut transcript, "fail", "amina").await.unwrap_err();
    assert!(matches!(err, PortalError::Api(ref api) if api.status() == Some(503)));

    let last = transcript.last_reply().unwrap();
    assert_eq!(last.role, ChatRole::System);
    assert_eq!(last.content, sante_core::chat::UNAVAILABLE);
}

#[tokio::test]
async fn test_patient_dashboard() {
    let (portal, _store, _backend) = signed_in_patient().await;
    let dashboard = portal.dashboard();

    let page = dashboard.patient(None).await;
    assert_eq!(page.vitals.unwrap().glucose.avg, Some(1.05));

    let alerts = page.alerts.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].message, "Analyse prescrite : NFS");

    let by_rating: Vec<String> = page
        .clinics
        .unwrap()
        .into_iter()
        .map(|r| r.clinic.id)
        .collect();
    assert_eq!(by_rating, vec!["far", "mid", "near"]);

    let doctors: Vec<String> = page
        .doctors
        .unwrap()
        .into_iter()
        .map(|d| d.username)
        .collect();
    assert_eq!(doctors, vec!["dr_b", "dr_a", "dr_d"]);

    let tunis = GeoPoint::new(36.8065, 10.1815);
    let page = dashboard.patient(Some(tunis)).await;
    let nearest = page.clinics.unwrap();
    assert_eq!(nearest[0].clinic.id, "near");
    assert!(nearest[0].distance_label().unwrap().ends_with(" m"));
    assert!(nearest[2].distance_label().unwrap().ends_with(" km"));
}

#[tokio::test]
async fn test_recommended_doctors_floor() {
    let (portal, _store, _backend) = signed_in_patient().await;
    let doctors = portal.doctors().recommended().await.unwrap();
    let names: Vec<&str> = doctors.iter().map(|d| d.username.as_str()).collect();
    assert_eq!(names, vec!["dr_b", "dr_a"]);
}

#[tokio::test]
async fn test_empty_reply_body() {
    let (portal, _store, _backend) = signed_in_patient().await;
    portal
        .documents()
        .delete(&sante_core::RecordId::from("d1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_scope_drops_late_reply() {
    let (portal, _store, _backend) = signed_in_patient().await;
    let scope = portal.scope();
    let clinics = portal.clinics();

    let listed = scope.run(clinics.list()).await.unwrap();
    assert_eq!(listed.len(), 3);

    scope.cancel();
    let late = scope.run(clinics.list()).await;
    assert!(matches!(late, Err(PortalError::Cancelled)));
}

#[tokio::test]
async fn test_login_without_refresh_token_forgets_old_one() {
    let (base_url, _backend) = start_backend().await;
    let store = Arc::new(MemoryStore::new());
    store.set(keys::REFRESH_TOKEN, "ref-old").unwrap();

    let portal = portal_for(&base_url, store.clone());
    portal.login(&Credentials::new("staff1", "secret")).await.unwrap();
    assert_eq!(store.get(keys::REFRESH_TOKEN).unwrap(), None);

    portal.session().restore().unwrap();
    let err = portal.session().refresh_access_token().await.unwrap_err();
    assert!(matches!(err, AuthError::MissingRefreshToken));
}

#[tokio::test]
async fn test_logout_during_profile_refresh_wins() {
    let (base_url, _backend) = start_backend().await;
    let store = Arc::new(MemoryStore::new());
    store.set(keys::ACCESS_TOKEN, "tok-lento").unwrap();
    store.set(keys::USER_ROLE, "patient").unwrap();

    let portal = portal_for(&base_url, store.clone());
    portal.session().restore().unwrap();

    let (refreshed, _) = tokio::join!(portal.session().refresh_profile(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        portal.logout().unwrap();
    });
    assert!(refreshed.unwrap().is_none());

    let snapshot = portal.session().snapshot();
    assert!(!snapshot.authenticated);
    assert_eq!(snapshot.role, None);
    assert!(snapshot.user.is_none());
    assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap(), None);
    assert_eq!(store.get(keys::USER_ROLE).unwrap(), None);
}

#[tokio::test]
async fn test_logout_during_login_wins() {
    let (base_url, _backend) = start_backend().await;
    let store = Arc::new(MemoryStore::new());
    let portal = portal_for(&base_url, store.clone());

    let credentials = Credentials::new("lento", "secret");
    let (login, _) = tokio::join!(portal.login(&credentials), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        portal.logout().unwrap();
    });
    assert!(matches!(
        login,
        Err(PortalError::Auth(AuthError::SessionEnded))
    ));

    let snapshot = portal.session().snapshot();
    assert!(!snapshot.authenticated);
    assert!(snapshot.user.is_none());
    assert!(portal.api().token().is_none());
    assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap(), None);
    assert_eq!(store.get(keys::USER_ROLE).unwrap(), None);
}

#[tokio::test]
async fn test_logout_during_enter_clinic_wins() {
    let (portal, store, _backend) = signed_in_patient().await;

    let (entered, _) = tokio::join!(portal.enter_clinic(Some("slow")), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        portal.logout().unwrap();
    });
    assert!(matches!(entered, Err(PortalError::TenancyEnded)));
    assert_eq!(store.get(keys::CURRENT_CLINIC).unwrap(), None);
    assert!(portal.clinic().current().is_none());
    assert!(!portal.theme().is_branded());

    // The next patient starts outside any clinic
    portal.login(&Credentials::new("amina", "secret")).await.unwrap();
    assert!(portal.clinic().current().is_none());
    match portal.navigate("/dashboard") {
        Decision::Render(entry) => assert_eq!(entry.view, View::PatientDashboard),
        other => panic!("expected render, got {:?}", other),
    }
}
