//! End-to-end tests of the HTTP API over an in-memory store.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{send, send_json, test_app, SAMPLE_CSV};

#[tokio::test]
async fn test_zipcode_lookup_after_populate() {
    let (app, _csv) = test_app(SAMPLE_CSV, 50.0).await;

    let (status, body) = send(&app, "POST", "/populate").await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        body.starts_with("Finished uploading 3 ZIP code datas in "),
        "unexpected populate message: {}",
        body
    );
    assert!(body.ends_with(" seconds"));

    let (status, record) = send_json(&app, "GET", "/zipcode/00501").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["zip"], "00501");
    assert_eq!(record["type"], "UNIQUE");
    assert_eq!(record["primary_city"], "Holtsville");
    assert_eq!(record["latitude"], 40.81);
    assert_eq!(record["longitude"], -73.04);
    assert_eq!(record["unacceptable_cities"], json!(["I R S Service Center"]));
    assert_eq!(record["irs_estimated_population"], 562.0);

    let (_, record) = send_json(&app, "GET", "/zipcode/10001").await;
    assert_eq!(record["area_codes"], json!(["718", "917", "347", "646"]));
}

#[tokio::test]
async fn test_zipcode_validation_and_not_found() {
    let (app, _csv) = test_app(SAMPLE_CSV, 50.0).await;
    send(&app, "POST", "/populate").await;

    assert_eq!(
        send(&app, "GET", "/zipcode/abc").await,
        (StatusCode::BAD_REQUEST, "Invalid ZIP code".to_string())
    );
    assert_eq!(
        send(&app, "GET", "/zipcode/123456").await,
        (StatusCode::BAD_REQUEST, "Invalid ZIP code".to_string())
    );
    assert_eq!(
        send(&app, "GET", "/zipcode/99950").await,
        (StatusCode::NOT_FOUND, "ZIP code not found".to_string())
    );
}

#[tokio::test]
async fn test_reverse_finds_nearest_zip() {
    let (app, _csv) = test_app(SAMPLE_CSV, 50.0).await;
    send(&app, "POST", "/populate").await;

    let (status, result) = send_json(&app, "GET", "/reverse/40.81/-73.04").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["zipCode"], "00501");
    assert_eq!(result["city"], "Holtsville");
    assert_eq!(result["lat"], 40.81);
    assert_eq!(result["long"], -73.04);
    assert_eq!(result["result"]["latitude"], 40.81);
    assert_eq!(result["result"]["longitude"], -73.04);
    assert_eq!(result["distanceKm"], 0.0);

    // Midtown Manhattan is closer to 10001 than to Holtsville
    let (_, result) = send_json(&app, "GET", "/reverse/40.7484/-73.9857").await;
    assert_eq!(result["zipCode"], "10001");
    assert!(result["distanceKm"].as_f64().unwrap() < 1.0);
}

#[tokio::test]
async fn test_reverse_outside_radius_is_not_found() {
    let (app, _csv) = test_app(SAMPLE_CSV, 1.0).await;
    send(&app, "POST", "/populate").await;

    assert_eq!(
        send(&app, "GET", "/reverse/0/0").await,
        (
            StatusCode::NOT_FOUND,
            "No ZIP code found for the given coordinates".to_string()
        )
    );
}

#[tokio::test]
async fn test_reverse_duplicate_coordinates_first_record_wins() {
    let csv = "zip,primary_city,latitude,longitude\n\
               00501,Holtsville,40.81,-73.04\n\
               00544,Holtsville,40.81,-73.04\n";
    let (app, _csv) = test_app(csv, 50.0).await;
    send(&app, "POST", "/populate").await;

    for _ in 0..3 {
        let (_, result) = send_json(&app, "GET", "/reverse/40.82/-73.05").await;
        assert_eq!(result["zipCode"], "00501");
    }
}

#[tokio::test]
async fn test_reverse_rejects_bad_input() {
    let (app, _csv) = test_app(SAMPLE_CSV, 50.0).await;
    send(&app, "POST", "/populate").await;

    for uri in ["/reverse/north/-73.04", "/reverse/91/0", "/reverse/0/181", "/reverse/NaN/0"] {
        assert_eq!(
            send(&app, "GET", uri).await,
            (
                StatusCode::BAD_REQUEST,
                "Invalid latitude or longitude".to_string()
            ),
            "{}",
            uri
        );
    }

    let (app, _csv) = test_app(SAMPLE_CSV, -5.0).await;
    send(&app, "POST", "/populate").await;
    assert_eq!(
        send(&app, "GET", "/reverse/40.81/-73.04").await,
        (StatusCode::BAD_REQUEST, "Invalid radius value".to_string())
    );
}

#[tokio::test]
async fn test_reverse_before_populate_and_with_empty_dataset() {
    let (app, _csv) = test_app(SAMPLE_CSV, 50.0).await;
    let (status, body) = send(&app, "GET", "/reverse/40.81/-73.04").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Failed to fetch master ZIP code data");

    let (app, _csv) = test_app("zip,latitude,longitude\n", 50.0).await;
    let (status, body) = send(&app, "POST", "/populate").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("Finished uploading 0 ZIP code datas"));
    assert_eq!(
        send(&app, "GET", "/reverse/40.81/-73.04").await,
        (StatusCode::NOT_FOUND, "No ZIP codes available".to_string())
    );
}

#[tokio::test]
async fn test_repopulate_refreshes_reverse_results() {
    let first = "zip,primary_city,latitude,longitude\n00501,Holtsville,40.81,-73.04\n";
    let (app, csv) = test_app(first, 50.0).await;
    send(&app, "POST", "/populate").await;
    let (_, result) = send_json(&app, "GET", "/reverse/40.81/-73.04").await;
    assert_eq!(result["zipCode"], "00501");

    std::fs::write(
        csv.path(),
        "zip,primary_city,latitude,longitude\n11742,Holbrook,40.81,-73.04\n",
    )
    .unwrap();
    send(&app, "POST", "/populate").await;
    let (_, result) = send_json(&app, "GET", "/reverse/40.81/-73.04").await;
    assert_eq!(result["zipCode"], "11742");
    assert_eq!(result["city"], "Holbrook");
}

#[tokio::test]
async fn test_repopulate_drops_zips_missing_from_source() {
    let first = "zip,primary_city,latitude,longitude\n\
                 00501,Holtsville,40.81,-73.04\n\
                 10001,New York,40.75,-73.99\n";
    let (app, csv) = test_app(first, 50.0).await;
    send(&app, "POST", "/populate").await;
    let (status, _) = send(&app, "GET", "/zipcode/00501").await;
    assert_eq!(status, StatusCode::OK);

    std::fs::write(
        csv.path(),
        "zip,primary_city,latitude,longitude\n11742,Holbrook,40.81,-73.04\n",
    )
    .unwrap();
    let (status, _) = send(&app, "POST", "/populate").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(
        send(&app, "GET", "/zipcode/00501").await,
        (StatusCode::NOT_FOUND, "ZIP code not found".to_string())
    );
    assert_eq!(
        send(&app, "GET", "/zipcode/10001").await.0,
        StatusCode::NOT_FOUND
    );
    let (status, record) = send_json(&app, "GET", "/zipcode/11742").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["primary_city"], "Holbrook");

    let (_, keys) = send_json(&app, "GET", "/all").await;
    assert_eq!(
        keys,
        json!([{
            "name": "11742",
            "metadata": {"zip": "11742", "long": -73.04, "latitude": 40.81}
        }])
    );

    let (_, master) = send_json(&app, "GET", "/master").await;
    assert_eq!(master.as_array().unwrap().len(), 1);
    assert_eq!(master[0]["zip"], "11742");
}

#[tokio::test]
async fn test_populate_reports_missing_source() {
    let (app, csv) = test_app(SAMPLE_CSV, 50.0).await;
    let path = csv.path().to_path_buf();
    drop(csv);
    assert!(!path.exists());

    let (status, body) = send_json(&app, "POST", "/populate").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to fetch CSV file"}));

    let (status, body) = send_json(&app, "GET", "/bulk").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to fetch CSV file"}));
}

#[tokio::test]
async fn test_populate_requires_post() {
    let (app, _csv) = test_app(SAMPLE_CSV, 50.0).await;
    let (status, _) = send(&app, "GET", "/populate").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_bulk_payload() {
    let (app, _csv) = test_app(SAMPLE_CSV, 50.0).await;

    let (status, bulk) = send_json(&app, "GET", "/bulk").await;
    assert_eq!(status, StatusCode::OK);
    let entries = bulk.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["key"], "00501");
    assert_eq!(
        entries[0]["metadata"],
        json!({"zip": "00501", "long": -73.04, "latitude": 40.81})
    );
    let value: serde_json::Value =
        serde_json::from_str(entries[0]["value"].as_str().unwrap()).unwrap();
    assert_eq!(value["primary_city"], "Holtsville");

    // Bulk only reads the source
    let (status, _) = send(&app, "GET", "/master").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_list_master_and_all() {
    let (app, _csv) = test_app(SAMPLE_CSV, 50.0).await;

    assert_eq!(
        send_json(&app, "GET", "/list").await,
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "Failed to fetch ZIP code list"})
        )
    );
    assert_eq!(
        send_json(&app, "GET", "/master").await,
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "Failed to fetch master ZIP code data"})
        )
    );

    send(&app, "POST", "/populate").await;

    let (status, master) = send_json(&app, "GET", "/master").await;
    assert_eq!(status, StatusCode::OK);
    let master = master.as_array().unwrap().clone();
    let zips: Vec<&str> = master.iter().map(|r| r["zip"].as_str().unwrap()).collect();
    assert_eq!(zips, vec!["00501", "10001", "96799"]);

    let (status, list) = send_json(&app, "GET", "/list").await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), master.len());
    for (point, record) in list.iter().zip(&master) {
        assert_eq!(point["latitude"], record["latitude"]);
        assert_eq!(point["longitude"], record["longitude"]);
        assert_eq!(point["zip"], record["zip"]);
    }

    let (status, keys) = send_json(&app, "GET", "/all").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = keys
        .as_array()
        .unwrap()
        .iter()
        .map(|k| k["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["00501", "10001", "96799"]);
    assert_eq!(
        keys[2]["metadata"],
        json!({"zip": "96799", "long": -170.7, "latitude": -14.27})
    );
}

#[tokio::test]
async fn test_malformed_rows_are_excluded() {
    let csv = "zip,primary_city,latitude,longitude\n\
               00501,Holtsville,40.81,-73.04\n\
               0050X,Broken,40.0,-73.0\n\
               00601,Adjuntas,95.0,-66.75\n\
               00501,Duplicate,40.0,-73.0\n";
    let (app, _csv) = test_app(csv, 50.0).await;

    let (status, body) = send(&app, "POST", "/populate").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("Finished uploading 1 ZIP code datas"));

    let (_, master) = send_json(&app, "GET", "/master").await;
    assert_eq!(master.as_array().unwrap().len(), 1);
    assert_eq!(master[0]["primary_city"], "Holtsville");
    assert_eq!(send(&app, "GET", "/zipcode/00601").await.0, StatusCode::NOT_FOUND);
}
