use super::*;

fn sample_profile() -> account::PublicProfile {
    account::PublicProfile {
        id: uuid::Uuid::new_v4(),
        email: "demo@x.com".into(),
        username: Some("demo_user".into()),
        full_name: "Demo User".into(),
        bio: "showcase account".into(),
        avatar_url: String::new(),
        saldo: 0,
        level: "Basic".into(),
        created_at: "2024-01-01T00:00:00".into(),
        is_active: true,
    }
}

#[test]
fn profile_with_stats_flattens_profile_fields() {
    let payload = ProfileWithStats {
        profile: sample_profile(),
        stats: ProfileStats { project_count: 2, total_views: 57 },
    };
    let json = serde_json::to_value(&payload).unwrap();
    // Flattened: profile fields sit at the top level next to stats.
    assert_eq!(json["username"], "demo_user");
    assert_eq!(json["stats"]["project_count"], 2);
    assert_eq!(json["stats"]["total_views"], 57);
    assert!(json.get("profile").is_none());
}

#[test]
fn stats_serialize_as_integers() {
    let stats = ProfileStats { project_count: 0, total_views: 0 };
    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["project_count"], 0);
    assert_eq!(json["total_views"], 0);
}
