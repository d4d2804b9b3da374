//! Built-in example campaign shown when no shared link is opened.

use super::campaign::{Campaign, Target, TargetId};

/// Build the example campaign.
pub fn seed_campaign() -> Campaign {
    Campaign {
        title: "MP Campaign Action".to_string(),
        global_subject: "Action Required".to_string(),
        global_body: "Please support our cause.".to_string(),
        mps: vec![
            example("ex-1", "Representative Arash", "arash@b.com", "this is text bofy gor send in preview"),
            example("ex-2", "Representative reza", "reza@bdsds.com", "this is text bofy dsfsdfsdfsdfsdfsdfsdfsdf"),
            example("ex-3", "Representative Arasdh", "arasdh@bdsds.com", "this reza"),
        ],
    }
}

fn example(id: &str, name: &str, email: &str, body: &str) -> Target {
    Target {
        id: TargetId::from(id),
        name: name.to_string(),
        email: email.to_string(),
        subject: Some("campion".to_string()),
        body: Some(body.to_string()),
        constituency: None,
    }
}
