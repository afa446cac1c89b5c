use langs_dal::language::Language;
use langs_e2e_tests::{base_url, extend_url, prepare_env, spawn_server};
use serde_json::json;
use tracing::info;
use tracing_test::traced_test;

fn record_path(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

async fn list(client: &reqwest::Client, url: reqwest::Url) -> Vec<Language> {
    let response = client.get(url).send().await.unwrap();
    info! {"Response: {:#?}", response};
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    serde_json::from_value(body["languages"].clone()).unwrap()
}

#[tokio::test]
#[traced_test]
async fn test_languages() {
    let (args, _config_guard) = prepare_env("test_languages").unwrap();
    let base_url = base_url(&args).unwrap();
    let _server = spawn_server(args).await.unwrap();
    let client = reqwest::Client::new();

    let langs = [
        json!({"name": "C", "creators": ["Ritchie"], "extensions": [".c", ".h"], "year": 1972}),
        json!({"name": "Go", "creators": ["Pike", "Thompson", "Griesemer"], "year": 2009,
            "firstAppeared": "2009-11-10T00:00:00Z"}),
        json!({"name": "B", "creators": ["Thompson", "Ritchie"], "year": 1969}),
    ];
    let mut paths = Vec::new();
    for lang in langs.iter() {
        let response = client.post(base_url.clone()).json(lang).send().await.unwrap();
        info!("Response: {:#?}", response);
        assert_eq!(response.status().as_u16(), 201);
        paths.push(record_path(&response));
        assert!(response.text().await.unwrap().is_empty());
    }

    let all = list(&client, base_url.clone()).await;
    assert_eq!(all.len(), langs.len());

    let mut query_url = base_url.clone();
    query_url.set_query(Some("creators=Thompson,Ritchie"));
    let found = list(&client, query_url).await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name.as_deref(), Some("B"));

    let mut query_url = base_url.clone();
    query_url.set_query(Some("Year=2009&name="));
    let found = list(&client, query_url).await;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name.as_deref(), Some("Go"));

    let mut query_url = base_url.clone();
    query_url.set_query(Some("year=0"));
    assert_eq!(list(&client, query_url).await.len(), langs.len());

    let go_url = base_url.join(&paths[1]).unwrap();
    let response = client.get(go_url.clone()).send().await.unwrap();
    assert!(response.status().is_success());
    let go: Language = response.json().await.unwrap();
    assert_eq!(go.creators.as_ref().map(Vec::len), Some(3));
    assert!(go.first_appeared.is_some());
    assert_eq!(
        go.id.map(|id| format!("/{id}")).as_deref(),
        Some(paths[1].as_str())
    );

    let response = client
        .patch(go_url.clone())
        .json(&json!({"wiki": "https://en.wikipedia.org/wiki/Go_(programming_language)"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = client
        .put(go_url.clone())
        .json(&json!({"name": "Golang", "year": 2009}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let golang: Language = client
        .get(go_url.clone())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(golang.name.as_deref(), Some("Golang"));
    assert_eq!(golang.wiki, None);
    assert_eq!(golang.creators, None);

    let response = client.delete(go_url.clone()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 204);
    let response = client.delete(go_url.clone()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let response = client.get(go_url.clone()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);

    assert_eq!(list(&client, base_url.clone()).await.len(), langs.len() - 1);
}

#[tokio::test]
#[traced_test]
async fn test_put_creates_record() {
    let (args, _config_guard) = prepare_env("test_put_creates").unwrap();
    let base_url = base_url(&args).unwrap();
    let _server = spawn_server(args).await.unwrap();
    let client = reqwest::Client::new();

    let id = langs_dal::ObjectId::new();
    let record_url = extend_url(&base_url, id);
    let response = client
        .put(record_url.clone())
        .json(&json!({"name": "Rust", "year": 2010}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    assert_eq!(record_path(&response), format!("/{id}"));

    let response = client
        .put(record_url.clone())
        .json(&json!({"name": "Rust", "year": 2015}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let rust: Language = client
        .get(record_url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rust.id, Some(id));
    assert_eq!(rust.year, Some(2015));
}

#[tokio::test]
#[traced_test]
async fn test_bad_requests() {
    let (args, _config_guard) = prepare_env("test_bad_requests").unwrap();
    let base_url = base_url(&args).unwrap();
    let _server = spawn_server(args).await.unwrap();
    let client = reqwest::Client::new();

    let bad_id_url = extend_url(&base_url, "123");
    let response = client.get(bad_id_url.clone()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(
        response.text().await.unwrap(),
        "The given id is not a valid id"
    );
    let response = client.delete(bad_id_url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let missing_url = extend_url(&base_url, langs_dal::ObjectId::new());
    let response = client
        .patch(missing_url.clone())
        .json(&json!({"name": "Nothing"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(
        response.text().await.unwrap(),
        "No language found with that id to update"
    );
    let response = client.get(missing_url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = client
        .post(base_url.clone())
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(response.text().await.unwrap(), "Invalid request body");

    let mut query_url = base_url.clone();
    query_url.set_query(Some("id=1"));
    let response = client.get(query_url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(response.text().await.unwrap(), "Invalid query string");

    assert!(list(&client, base_url).await.is_empty());
}
