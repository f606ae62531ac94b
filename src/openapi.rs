use rocket_okapi::okapi::openapi3::{Info, License, OpenApi, Server, Tag};

pub fn custom_openapi_spec() -> OpenApi {
    OpenApi {
        openapi: OpenApi::default_version(),
        info: Info {
            title: "Job Application Management System".to_owned(),
            description: Some("Create, read, update and delete jobs, candidates and the applications that link them.".to_owned()),
            license: Some(License {
                name: "MIT".to_owned(),
                ..Default::default()
            }),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            ..Default::default()
        },
        servers: vec![Server {
            url: "/".to_owned(),
            description: Some("this server".to_owned()),
            ..Default::default()
        }],
        tags: ["Root", "Jobs", "Candidates", "Applications"]
            .iter()
            .map(|name| Tag {
                name: name.to_string(),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}
