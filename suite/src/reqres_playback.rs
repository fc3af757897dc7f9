//! Canned rendition of the ReqRes users resource, served by `sitecheck::StubServer`.

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use sitecheck::{RecordedRequest, StubResponse, StubRoute};
use std::{
    convert::TryFrom,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

const DEFAULT_PER_PAGE: u64 = 6;
const FIRST_CREATED_ID: u64 = 101;

const USERS: &[(u64, &str, &str)] = &[
    (1, "George", "Bluth"),
    (2, "Janet", "Weaver"),
    (3, "Emma", "Wong"),
    (4, "Eve", "Holt"),
    (5, "Charles", "Morris"),
    (6, "Tracey", "Ramos"),
    (7, "Michael", "Lawson"),
    (8, "Lindsay", "Ferguson"),
    (9, "Tobias", "Funke"),
    (10, "Byron", "Fields"),
    (11, "George", "Edwards"),
    (12, "Rachel", "Howell"),
];

pub fn user_record(id: u64, first_name: &str, last_name: &str) -> Value {
    json!({
        "id": id,
        "email": format!("{}.{}@reqres.in", first_name.to_lowercase(), last_name.to_lowercase()),
        "first_name": first_name,
        "last_name": last_name,
        "avatar": format!("https://reqres.in/img/faces/{}-image.jpg", id),
    })
}

fn support() -> Value {
    json!({
        "url": "https://contentcaddy.io?utm_source=reqres&utm_medium=json&utm_campaign=referral",
        "text": "Tired of writing endless social media content? Let Content Caddy generate it for you.",
    })
}

/// Routes answering like `https://reqres.in/api` does for the users resource.
///
/// Requests without the expected `x-api-key` are refused: `401` when the key is missing or
/// empty, `403` when it is wrong.
pub fn reqres_routes(api_key: &str) -> Vec<StubRoute> {
    let next_id = Arc::new(AtomicU64::new(FIRST_CREATED_ID));

    let list_key = String::from(api_key);
    let user_key = String::from(api_key);
    let create_key = String::from(api_key);

    vec![
        StubRoute::get("/api/users", move |request| {
            authorized(request, &list_key).unwrap_or_else(|| list_users(request))
        }),
        StubRoute::get("/api/users/{id}", move |request| {
            authorized(request, &user_key).unwrap_or_else(|| get_user(request))
        }),
        StubRoute::post("/api/users", move |request| {
            authorized(request, &create_key).unwrap_or_else(|| create_user(request, &next_id))
        }),
    ]
}

/// `Some(refusal)` when the request does not carry `api_key`.
fn authorized(request: &RecordedRequest, api_key: &str) -> Option<StubResponse> {
    match request.header("x-api-key") {
        Some(key) if key == api_key => None,
        Some(key) if !key.is_empty() => Some(StubResponse::json(
            403,
            json!({ "error": "Invalid API key" }),
        )),
        _ => Some(StubResponse::json(
            401,
            json!({ "error": "Missing API key" }),
        )),
    }
}

fn list_users(request: &RecordedRequest) -> StubResponse {
    let page = positive_param(request, "page").unwrap_or(1);
    let per_page = positive_param(request, "per_page").unwrap_or(DEFAULT_PER_PAGE);
    let total = USERS.len() as u64;
    let total_pages = total.saturating_add(per_page - 1) / per_page;
    let skip = (page - 1).saturating_mul(per_page);

    let data = USERS
        .iter()
        .skip(usize::try_from(skip).unwrap_or(usize::MAX))
        .take(usize::try_from(per_page).unwrap_or(usize::MAX))
        .map(|(id, first_name, last_name)| user_record(*id, first_name, last_name))
        .collect::<Vec<_>>();

    StubResponse::json(
        200,
        json!({
            "page": page,
            "per_page": per_page,
            "total": total,
            "total_pages": total_pages,
            "data": data,
            "support": support(),
        }),
    )
}

fn get_user(request: &RecordedRequest) -> StubResponse {
    let user = request
        .last_segment()
        .parse::<u64>()
        .ok()
        .and_then(|id| USERS.iter().find(|(user_id, _, _)| *user_id == id));

    match user {
        Some((id, first_name, last_name)) => StubResponse::json(
            200,
            json!({
                "data": user_record(*id, first_name, last_name),
                "support": support(),
            }),
        ),
        None => StubResponse::json(404, json!({})),
    }
}

fn create_user(request: &RecordedRequest, next_id: &AtomicU64) -> StubResponse {
    let mut user = match request.json() {
        Ok(Value::Object(user)) => user,
        Ok(_) | Err(_) => return StubResponse::json(400, json!({ "error": "Bad Request" })),
    };

    let id = next_id.fetch_add(1, Ordering::SeqCst);
    user.insert("id".into(), Value::String(id.to_string()));
    user.insert(
        "createdAt".into(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );

    StubResponse::json(201, Value::Object(user))
}

fn positive_param(request: &RecordedRequest, name: &str) -> Option<u64> {
    request
        .query_param(name)
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
}
