use crate::access::{
    authorize, require_admin, AccessContext, AccessProfile, Action, Decision, PermissionFlag,
    UnknownAction,
};

fn contexts() -> [AccessContext; 2] {
    [AccessContext::owner(), AccessContext::third_party()]
}

#[test]
fn administrators_are_allowed_every_action() {
    let mut admin = AccessProfile::administrator("admin", "Administrador");
    // Flags are irrelevant once the admin bit is set, even when explicitly cleared.
    admin.can_apply_checklists = false;
    admin.can_view_history = false;

    for action in Action::ALL {
        for context in contexts() {
            assert_eq!(authorize(&admin, action, &context), Decision::Allow, "{action}");
        }
    }
}

#[test]
fn each_action_is_gated_by_exactly_one_flag() {
    let table = [
        (Action::ApplyChecklist, PermissionFlag::ApplyChecklists),
        (Action::ApproveOrReject, PermissionFlag::ApproveChecklists),
        (Action::ViewOthersIncomplete, PermissionFlag::ViewOthersIncomplete),
        (Action::ReopenCompleted, PermissionFlag::ReopenCompleted),
        (Action::DeleteChecklist, PermissionFlag::DeleteChecklists),
        (Action::CommentOnEvaluation, PermissionFlag::CommentEvaluations),
        (Action::ViewHistory, PermissionFlag::ViewHistory),
    ];
    assert_eq!(table.len(), Action::ALL.len());

    for (action, flag) in table {
        for enabled in [true, false] {
            let profile = AccessProfile::restricted("p", "Perfil").with_flag(flag, enabled);

            let decision = authorize(&profile, action, &AccessContext::default());

            if enabled {
                assert_eq!(decision, Decision::Allow, "{action} with flag set");
            } else {
                assert_eq!(
                    decision,
                    Decision::Deny {
                        reason: format!("missing permission: {}", flag.field_name()),
                    },
                    "{action} with flag cleared"
                );
            }

            for other in Action::ALL.into_iter().filter(|other| *other != action) {
                assert!(
                    !authorize(&profile, other, &AccessContext::default()).is_allowed(),
                    "{flag:?} must not grant {other}"
                );
            }
        }
    }
}

#[test]
fn ownership_does_not_change_the_decision() {
    let profile = AccessProfile::restricted("driver", "Motorista")
        .with_flag(PermissionFlag::ApplyChecklists, true);

    for action in Action::ALL {
        let as_owner = authorize(&profile, action, &AccessContext::owner());
        let as_third_party = authorize(&profile, action, &AccessContext::third_party());
        assert_eq!(as_owner, as_third_party, "{action}");
    }
}

#[test]
fn action_names_parse_strictly() {
    assert_eq!("reopen_completed".parse::<Action>(), Ok(Action::ReopenCompleted));
    assert_eq!(" view_history ".parse::<Action>(), Ok(Action::ViewHistory));
    assert_eq!(
        "export_everything".parse::<Action>(),
        Err(UnknownAction("export_everything".to_string()))
    );
}

#[test]
fn denials_convert_into_permission_errors() {
    let profile = AccessProfile::restricted("driver", "Motorista");

    let denied = authorize(&profile, Action::DeleteChecklist, &AccessContext::default())
        .into_result(Action::DeleteChecklist)
        .expect_err("delete is not granted");

    assert_eq!(denied.operation, "delete_checklist");
    assert_eq!(denied.reason, "missing permission: can_delete_checklists");
}

#[test]
fn template_management_requires_the_admin_bit() {
    let everything = Action::ALL.into_iter().fold(
        AccessProfile::restricted("lead", "Líder"),
        |profile, action| profile.with_flag(action.permission_flag(), true),
    );

    assert!(require_admin(&everything, "create_template").is_err());
    assert!(require_admin(
        &AccessProfile::administrator("admin", "Administrador"),
        "create_template"
    )
    .is_ok());
}

#[test]
fn profiles_deserialize_with_missing_flags_cleared() {
    let profile: AccessProfile = serde_json::from_str(
        r#"{ "id": "p1", "name": "Conferente", "can_view_history": true }"#,
    )
    .expect("profile parses");

    assert!(!profile.is_admin);
    assert!(profile.flag(PermissionFlag::ViewHistory));
    assert!(!profile.flag(PermissionFlag::ApplyChecklists));
}
