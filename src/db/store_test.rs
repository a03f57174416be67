use super::*;

fn uid(raw: i64) -> UserId {
    UserId::from_raw(raw).unwrap()
}

#[test]
fn role_columns_target_the_single_role_row() {
    assert_eq!(RoleColumn::Leader.select_sql(), "SELECT leader_id FROM role_state WHERE id = 1");
    assert_eq!(RoleColumn::Editor.update_sql(), "UPDATE role_state SET editor_id = $1 WHERE id = 1");
    assert_eq!(RoleColumn::LastEditor.as_str(), "last_editor_id");
}

#[test]
fn stored_row_becomes_item() {
    let item = row_to_item(uid(3), (71, 5, "Sprint planning".into(), "1:30".into())).unwrap();
    assert_eq!(item.id, 71);
    assert_eq!(item.user_id, uid(3));
    assert_eq!(item.row_index, 5);
    assert_eq!(item.time_spent, TimeSpent::OneAndHalf);
}

#[test]
fn unknown_time_label_reads_as_unset() {
    let item = row_to_item(uid(1), (1, 0, String::new(), "banana".into())).unwrap();
    assert_eq!(item.time_spent, TimeSpent::Unset);
}

#[test]
fn negative_row_index_is_skipped() {
    assert!(row_to_item(uid(1), (1, -1, String::new(), String::new())).is_none());
}

#[tokio::test]
async fn offline_store_fails_every_call_with_setup_message() {
    let store = OfflineStore::new("DATABASE_URL is not configured");
    let expected = StoreError::Unavailable("DATABASE_URL is not configured".into());

    assert_eq!(store.list_users().await.unwrap_err(), expected);
    assert_eq!(store.set_current_editor_id(None).await.unwrap_err(), expected);
    assert_eq!(store.item_rows(uid(1), 0, 4).await.unwrap_err(), expected);
}
