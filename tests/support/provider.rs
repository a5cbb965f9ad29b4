//! Mock provider serving the whole login flow and the roster endpoint.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ROSTER_BODY: &str = concat!(
    ")]}'\n",
    r#"[[[["uid-1","https://photos.example/a.jpg",null,"Alice Example"],[null,[null,12.5,55.1]]],"#,
    r#"[["uid-2","https://photos.example/b.jpg",null,"Bob Example"],[null,[null,-0.1278,51.5074]]]],"x"]"#,
    "\n",
);

/// Mounts every provider endpoint; the roster answers with `roster_status`.
#[allow(dead_code)]
pub async fn mount_provider(server: &MockServer, roster_status: u16) {
    Mock::given(method("GET"))
        .and(path("/ServiceLogin"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "GAPS=g1")
                .set_body_string(r#"<input type="hidden" name="gxf" value="gxf-1">"#),
        )
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/signin/v1/lookup"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "GALX=x1")
                .set_body_string(concat!(
                    r#"<input id="profile-information" name="ProfileInformation" type="hidden" value="pi">"#,
                    r#"<input id="session-state" name="SessionState" type="hidden" value="ss">"#,
                )),
        )
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/signin/challenge/sl/password"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("set-cookie", "SID=s1")
                .insert_header("location", format!("{}/CheckCookie", server.uri())),
        )
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/CheckCookie"))
        .respond_with(ResponseTemplate::new(302).insert_header("set-cookie", "HSID=h1"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/maps/preview/locationsharing/read"))
        .and(query_param("authuser", "0"))
        .respond_with(ResponseTemplate::new(roster_status).set_body_string(ROSTER_BODY))
        .mount(server)
        .await;
}

