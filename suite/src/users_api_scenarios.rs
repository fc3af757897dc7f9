//! Contract scenarios for the ReqRes users resource.
//!
//! Each scenario takes a ready `UsersApi` and stops at the first failed check, so the same
//! scenario runs against the live service and against the canned playback routes.

use crate::{
    error::Error,
    reqres::{response_times, status_codes, test_data, UsersApi},
};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde_json::{json, Value};
use sitecheck::{
    validators, ApiUserPayload, AssertionFailure, FieldValidationSpec, RequestDescriptor,
    TestDataGenerator, ValidationKind,
};
use std::{collections::HashSet, time::Duration};
use tracing::{info, warn};

const CREATED_AT_TOLERANCE: Duration = Duration::from_secs(5);
const LARGE_PAYLOAD_TIMEOUT: Duration = Duration::from_secs(15);

fn check<S1, S2>(condition: bool, subject: &str, expected: S1, actual: S2) -> Result<(), Error>
where
    S1: Into<String>,
    S2: Into<String>,
{
    if condition {
        Ok(())
    } else {
        Err(sitecheck::Error::AssertionFailed(AssertionFailure::new(
            subject, expected, actual,
        ))
        .into())
    }
}

fn payload(user: &ApiUserPayload) -> Result<Value, Error> {
    Ok(serde_json::to_value(user).map_err(sitecheck::Error::from)?)
}

fn user_ids(body: &Value) -> Vec<Value> {
    body["data"]
        .as_array()
        .map(|users| users.iter().map(|user| user["id"].clone()).collect())
        .unwrap_or_default()
}

pub async fn get_existing_user(api: &UsersApi) -> Result<(), Error> {
    let response = api.get_user(test_data::EXISTING_USER_ID).await?;

    validators::assert_status(&response, status_codes::OK)?;
    validators::assert_within_duration(&response, response_times::ACCEPTABLE)?;

    let user = &response.body["data"];
    ValidationKind::Existence.check("data", user)?;
    validators::assert_shape(user, &FieldValidationSpec::default())?;
    validators::assert_field_eq(user, "id", &json!(test_data::EXISTING_USER_ID))?;

    validators::assert_support_block(&response)?;
    ValidationKind::UrlShape.check("support.url", &response.body["support"]["url"])?;

    Ok(())
}

pub async fn get_missing_user(api: &UsersApi) -> Result<(), Error> {
    let response = api.get_user(test_data::NON_EXISTENT_USER_ID).await?;

    validators::assert_status(&response, status_codes::NOT_FOUND)?;
    validators::assert_empty_body(&response)?;

    Ok(())
}

pub async fn get_user_with_invalid_id(api: &UsersApi) -> Result<(), Error> {
    let response = api.get_user(test_data::INVALID_USER_ID).await?;

    validators::assert_status_one_of(
        &response,
        &[status_codes::BAD_REQUEST, status_codes::NOT_FOUND],
    )?;

    Ok(())
}

pub async fn user_schema_is_consistent(api: &UsersApi) -> Result<(), Error> {
    for id in 1..=3u64 {
        let response = api.get_user(id).await?;

        if response.status_code == status_codes::OK {
            let user = &response.body["data"];
            validators::assert_shape(user, &FieldValidationSpec::default())?;
            validators::assert_field_eq(user, "id", &json!(id))?;
        } else {
            warn!(id, status = response.status_code, "user skipped");
        }
    }

    Ok(())
}

pub async fn list_users_with_default_pagination(api: &UsersApi) -> Result<(), Error> {
    let response = api.list_users(None, None).await?;

    validators::assert_status(&response, status_codes::OK)?;
    validators::assert_within_duration(&response, response_times::ACCEPTABLE)?;
    validators::assert_pagination_envelope(&response, 1)?;

    let users = response.body["data"].as_array().cloned().unwrap_or_default();
    let per_page = response.body["per_page"].as_u64().unwrap_or_default();
    check(
        !users.is_empty() && users.len() as u64 == per_page,
        "data length",
        format!("per_page ({}) users", per_page),
        users.len().to_string(),
    )?;

    let spec = FieldValidationSpec::default();
    for user in &users {
        validators::assert_shape(user, &spec)?;
    }

    validators::assert_support_block(&response)?;

    Ok(())
}

pub async fn list_users_with_custom_pagination(api: &UsersApi) -> Result<(), Error> {
    for (page, per_page) in &[(1u64, 3u64), (2, 2), (1, 5)] {
        let response = api.list_users(Some(*page), Some(*per_page)).await?;

        validators::assert_status(&response, status_codes::OK)?;
        validators::assert_pagination_envelope(&response, *page)?;
        validators::assert_field_eq(&response.body, "per_page", &json!(per_page))?;

        let returned = user_ids(&response.body).len() as u64;
        check(
            returned <= *per_page,
            "data length",
            format!("at most {}", per_page),
            returned.to_string(),
        )?;
    }

    Ok(())
}

pub async fn list_users_out_of_range(api: &UsersApi) -> Result<(), Error> {
    let response = api
        .list_users(Some(test_data::LARGE_PAGE_NUMBER), None)
        .await?;

    validators::assert_status(&response, status_codes::OK)?;
    validators::assert_field_eq(&response.body, "page", &json!(test_data::LARGE_PAGE_NUMBER))?;
    validators::assert_field_eq(&response.body, "data", &json!([]))?;

    Ok(())
}

pub async fn pages_do_not_overlap(api: &UsersApi) -> Result<(), Error> {
    let first_page = api.list_users(Some(1), Some(3)).await?;
    let second_page = api.list_users(Some(2), Some(3)).await?;

    let first_ids = user_ids(&first_page.body);
    let overlap = user_ids(&second_page.body)
        .into_iter()
        .filter(|id| first_ids.contains(id))
        .collect::<Vec<_>>();

    if overlap.is_empty() {
        Ok(())
    } else {
        Err(Error::InconsistentData(format!(
            "user ids {:?} appear on both page 1 and page 2",
            overlap
        )))
    }
}

pub async fn list_users_is_fast(api: &UsersApi) -> Result<(), Error> {
    let response = api.list_users(None, None).await?;

    validators::assert_within_duration(&response, response_times::FAST)?;

    let returned = user_ids(&response.body).len();
    check(
        (1..=20).contains(&returned),
        "data length",
        "between 1 and 20",
        returned.to_string(),
    )
}

pub async fn create_user(api: &UsersApi) -> Result<(), Error> {
    let user = TestDataGenerator::new().api_user();
    let response = api.create_user(payload(&user)?).await?;

    validators::assert_status(&response, status_codes::CREATED)?;
    validators::assert_field_eq(&response.body, "name", &json!(user.name))?;
    validators::assert_field_eq(&response.body, "job", &json!(user.job))?;
    check(
        response.body["id"].is_string(),
        "id",
        "a string",
        response.body["id"].to_string(),
    )?;

    let created_at = response.body["createdAt"].as_str().unwrap_or_default();
    let created_at = DateTime::parse_from_rfc3339(created_at)
        .map_err(|_| Error::InvalidTimestamp(created_at.into()))?;
    let skew = (Utc::now() - created_at.with_timezone(&Utc))
        .num_milliseconds()
        .abs();
    check(
        skew <= CREATED_AT_TOLERANCE.as_millis() as i64,
        "createdAt",
        format!("within {}ms of now", CREATED_AT_TOLERANCE.as_millis()),
        format!("{}ms away", skew),
    )
}

pub async fn create_user_with_partial_data(api: &UsersApi) -> Result<(), Error> {
    let user = TestDataGenerator::new().api_user();
    let response = api.create_user(json!({ "name": user.name })).await?;

    validators::assert_status(&response, status_codes::CREATED)?;
    validators::assert_field_eq(&response.body, "name", &json!(user.name))?;
    ValidationKind::Existence.check("id", &response.body["id"])?;
    ValidationKind::Existence.check("createdAt", &response.body["createdAt"])?;

    Ok(())
}

pub async fn create_user_with_nested_data(api: &UsersApi) -> Result<(), Error> {
    let user = TestDataGenerator::new().api_user();
    let mut body = payload(&user)?;
    if let Value::Object(fields) = &mut body {
        fields.insert("age".into(), json!(30));
        fields.insert(
            "skills".into(),
            json!(["Testing", "Automation", "JavaScript"]),
        );
        fields.insert(
            "contact".into(),
            json!({ "email": user.email, "phone": "+1-555-0123" }),
        );
        fields.insert("isActive".into(), json!(true));
        fields.insert(
            "metadata".into(),
            json!({ "department": "QA", "level": "Senior" }),
        );
    }

    let response = api.create_user(body).await?;

    validators::assert_status(&response, status_codes::CREATED)?;
    validators::assert_field_eq(&response.body, "name", &json!(user.name))?;
    validators::assert_field_eq(&response.body, "job", &json!(user.job))?;

    Ok(())
}

pub async fn concurrent_creations_get_unique_ids(api: &UsersApi) -> Result<(), Error> {
    let mut generator = TestDataGenerator::new();
    let bodies = (0..3)
        .map(|_| payload(&generator.api_user()))
        .collect::<Result<Vec<_>, _>>()?;

    let responses = join_all(bodies.into_iter().map(|body| api.create_user(body))).await;

    let mut ids = Vec::new();
    for response in responses {
        let response = response?;
        validators::assert_status(&response, status_codes::CREATED)?;
        ids.push(response.body["id"].to_string());
    }

    let unique = ids.iter().collect::<HashSet<_>>();
    if unique.len() == ids.len() {
        Ok(())
    } else {
        Err(Error::InconsistentData(format!(
            "concurrent creations returned duplicate ids {:?}",
            ids
        )))
    }
}

/// Whether malformed JSON is rejected is up to the service; both answers are accepted.
pub async fn create_user_with_malformed_json(api: &UsersApi) -> Result<(), Error> {
    let response = api
        .execute(
            RequestDescriptor::post(api.users_url()).with_raw_body(r#"{"name": "Test", "job":}"#),
        )
        .await?;

    validators::assert_status_one_of(
        &response,
        &[status_codes::BAD_REQUEST, status_codes::CREATED],
    )?;
    if response.status_code == status_codes::CREATED {
        warn!("malformed JSON was accepted");
    }

    Ok(())
}

pub async fn create_user_with_large_payload(api: &UsersApi) -> Result<(), Error> {
    let user = TestDataGenerator::new().api_user();
    let mut body = payload(&user)?;
    body["largeData"] = json!("A".repeat(test_data::LARGE_DATA_SIZE));

    let response = api
        .execute(
            RequestDescriptor::post(api.users_url())
                .with_json(body)
                .with_timeout(LARGE_PAYLOAD_TIMEOUT),
        )
        .await?;

    validators::assert_status_one_of(
        &response,
        &[status_codes::CREATED, status_codes::PAYLOAD_TOO_LARGE],
    )?;

    Ok(())
}

pub async fn create_user_with_unicode(api: &UsersApi) -> Result<(), Error> {
    let name = "测试用户 José María";
    let job = "Développeur Senior 🚀";

    let response = api
        .create_user(json!({
            "name": name,
            "job": job,
            "specialChars": r#"!@#$%^&*()_+-={}[]|\:";'<>?,./"#,
            "emoji": "👨‍💻🔧⚡",
        }))
        .await?;

    validators::assert_status(&response, status_codes::CREATED)?;
    validators::assert_field_eq(&response.body, "name", &json!(name))?;
    validators::assert_field_eq(&response.body, "job", &json!(job))?;

    Ok(())
}

/// Whether the API key is enforced is up to the service; the observed status is logged.
pub async fn authentication_behavior(api: &UsersApi) -> Result<(), Error> {
    let cases = vec![
        ("missing API key", None),
        ("invalid API key", Some("invalid-key-12345")),
        ("empty API key", Some("")),
    ];

    for (description, api_key) in cases {
        let mut descriptor = RequestDescriptor::get(api.user_url(1))
            .without_default_headers()
            .with_header("Content-Type", "application/json");
        if let Some(api_key) = api_key {
            descriptor = descriptor.with_header("x-api-key", api_key);
        }

        let response = api.execute(descriptor).await?;
        info!(
            case = description,
            status = response.status_code,
            "authentication behavior"
        );

        validators::assert_status_one_of(
            &response,
            &[
                status_codes::OK,
                status_codes::UNAUTHORIZED,
                status_codes::FORBIDDEN,
            ],
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reqres_playback::reqres_routes;
    use sitecheck::{scenario_test, HarnessConfiguration, StubResponse, StubRoute, StubServer};

    async fn playback(
        mut configuration: HarnessConfiguration,
    ) -> Result<(StubServer, UsersApi), Error> {
        let server = StubServer::start(reqres_routes(configuration.api_key())).await?;
        configuration.set_api_base_url(server.url("/api"));

        Ok((server, UsersApi::new(&configuration)))
    }

    macro_rules! users_api_scenario {
        ($scenario:ident, $playback:ident, $live:ident) => {
            #[scenario_test]
            async fn $playback(configuration: HarnessConfiguration) -> Result<(), Error> {
                let (_server, api) = playback(configuration).await?;
                $scenario(&api).await
            }

            #[scenario_test]
            #[ignore]
            async fn $live(configuration: HarnessConfiguration) -> Result<(), Error> {
                $scenario(&UsersApi::new(&configuration)).await
            }
        };
    }

    users_api_scenario!(
        get_existing_user,
        test_get_existing_user_playback,
        test_get_existing_user_live
    );
    users_api_scenario!(
        get_missing_user,
        test_get_missing_user_playback,
        test_get_missing_user_live
    );
    users_api_scenario!(
        get_user_with_invalid_id,
        test_get_user_with_invalid_id_playback,
        test_get_user_with_invalid_id_live
    );
    users_api_scenario!(
        user_schema_is_consistent,
        test_user_schema_is_consistent_playback,
        test_user_schema_is_consistent_live
    );
    users_api_scenario!(
        list_users_with_default_pagination,
        test_list_users_with_default_pagination_playback,
        test_list_users_with_default_pagination_live
    );
    users_api_scenario!(
        list_users_with_custom_pagination,
        test_list_users_with_custom_pagination_playback,
        test_list_users_with_custom_pagination_live
    );
    users_api_scenario!(
        list_users_out_of_range,
        test_list_users_out_of_range_playback,
        test_list_users_out_of_range_live
    );
    users_api_scenario!(
        pages_do_not_overlap,
        test_pages_do_not_overlap_playback,
        test_pages_do_not_overlap_live
    );
    users_api_scenario!(
        list_users_is_fast,
        test_list_users_is_fast_playback,
        test_list_users_is_fast_live
    );
    users_api_scenario!(create_user, test_create_user_playback, test_create_user_live);
    users_api_scenario!(
        create_user_with_partial_data,
        test_create_user_with_partial_data_playback,
        test_create_user_with_partial_data_live
    );
    users_api_scenario!(
        create_user_with_nested_data,
        test_create_user_with_nested_data_playback,
        test_create_user_with_nested_data_live
    );
    users_api_scenario!(
        concurrent_creations_get_unique_ids,
        test_concurrent_creations_get_unique_ids_playback,
        test_concurrent_creations_get_unique_ids_live
    );
    users_api_scenario!(
        create_user_with_malformed_json,
        test_create_user_with_malformed_json_playback,
        test_create_user_with_malformed_json_live
    );
    users_api_scenario!(
        create_user_with_large_payload,
        test_create_user_with_large_payload_playback,
        test_create_user_with_large_payload_live
    );
    users_api_scenario!(
        create_user_with_unicode,
        test_create_user_with_unicode_playback,
        test_create_user_with_unicode_live
    );
    users_api_scenario!(
        authentication_behavior,
        test_authentication_behavior_playback,
        test_authentication_behavior_live
    );

    #[scenario_test]
    async fn test_default_headers_reach_the_service_playback(
        configuration: HarnessConfiguration,
    ) -> Result<(), Error> {
        let api_key = String::from(configuration.api_key());
        let (server, api) = playback(configuration).await?;

        api.create_user(json!({ "name": "Jane" })).await?;
        api.execute(
            RequestDescriptor::get(api.user_url(1))
                .with_header("X-API-KEY", "override")
                .with_header("accept", "application/json"),
        )
        .await?;

        let requests = server.requests();
        check(requests.len() == 2, "requests", "2", requests.len().to_string())?;

        let create = &requests[0];
        check(
            create.header("x-api-key") == Some(api_key.as_str()),
            "x-api-key",
            api_key.as_str(),
            format!("{:?}", create.header("x-api-key")),
        )?;
        check(
            create.header("content-type") == Some("application/json"),
            "content-type",
            "application/json",
            format!("{:?}", create.header("content-type")),
        )?;

        let get = &requests[1];
        check(
            get.header("x-api-key") == Some("override"),
            "x-api-key",
            "override",
            format!("{:?}", get.header("x-api-key")),
        )?;
        check(
            get.header("accept") == Some("application/json"),
            "accept",
            "application/json",
            format!("{:?}", get.header("accept")),
        )
    }

    #[scenario_test]
    async fn test_fail_on_status_code_playback(
        configuration: HarnessConfiguration,
    ) -> Result<(), Error> {
        let (_server, api) = playback(configuration).await?;

        let result = api
            .execute(
                RequestDescriptor::get(api.user_url(test_data::NON_EXISTENT_USER_ID))
                    .failing_on_status_code(),
            )
            .await;

        match result {
            Err(sitecheck::Error::UnexpectedStatus { status_code, .. }) => check(
                status_code == status_codes::NOT_FOUND,
                "status code",
                "404",
                status_code.to_string(),
            ),
            Err(e) => Err(e.into()),
            Ok(response) => check(
                false,
                "outcome",
                "an unexpected status error",
                format!("status {}", response.status_code),
            ),
        }
    }

    fn short_response_timeout(configuration: &mut HarnessConfiguration) {
        configuration.set_response_timeout(Duration::from_millis(100));
    }

    #[scenario_test(short_response_timeout)]
    async fn test_slow_response_times_out_playback(
        mut configuration: HarnessConfiguration,
    ) -> Result<(), Error> {
        let server = StubServer::start(vec![StubRoute::get("/api/users", |_| {
            StubResponse::json(200, json!({})).with_delay(Duration::from_millis(500))
        })])
        .await?;
        configuration.set_api_base_url(server.url("/api"));
        let api = UsersApi::new(&configuration);

        match api.list_users(None, None).await {
            Err(e) if e.is_timeout() => Ok(()),
            Err(e) => Err(e.into()),
            Ok(response) => check(
                false,
                "outcome",
                "a timeout",
                format!("status {}", response.status_code),
            ),
        }
    }
}
