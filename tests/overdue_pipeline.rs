//! Query planning, paging, degradation, and report generation against a
//! canned repository.

mod common;

use common::{database, date_value, id, row, select_value, title_value, MockNotion};
use notion2mail::{
    build_filter_plan, plan_and_fetch, process_database, DatabaseTarget, PropertyKind,
    QueryIntent, ResolvedColumns, TaskRow,
};

fn target(status_equals: Option<&str>) -> DatabaseTarget {
    DatabaseTarget {
        id: id(1).to_hyphenated(),
        recipients: vec!["team@example.com".to_string()],
        schema: None,
        status_equals: status_equals.map(str::to_string),
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

fn simple_rows(count: u32, offset: u32) -> Vec<TaskRow> {
    (0..count)
        .map(|i| {
            row(
                offset + i,
                vec![("Name", title_value(&format!("task {}", offset + i)))],
            )
        })
        .collect()
}

#[tokio::test]
async fn pager_accumulates_every_page_in_order() {
    let db = id(1);
    let mut mock = MockNotion::new();
    mock.databases
        .insert(db.clone(), database(&db, "Tracker", &[("Name", PropertyKind::Title)]));
    mock.row_pages = vec![
        simple_rows(100, 0),
        simple_rows(100, 100),
        simple_rows(37, 200),
    ];

    let columns = ResolvedColumns::default();
    let plan = build_filter_plan(&columns, None, QueryIntent::Overdue, today());
    let rows = plan_and_fetch(&mock, &db, &plan).await.unwrap();

    assert_eq!(rows.len(), 237);
    // page order is preserved
    assert_eq!(rows[0].id, id(0x1000_0000));
    assert_eq!(rows[100].id, id(0x1000_0000 + 100));
    assert_eq!(rows[236].id, id(0x1000_0000 + 236));

    // the cursor chain was followed: None, c1, c2
    let cursors = mock.seen_cursors.lock().unwrap().clone();
    assert_eq!(
        cursors,
        vec![None, Some("c1".to_string()), Some("c2".to_string())]
    );
}

#[tokio::test]
async fn unresolved_status_column_filters_client_side_without_dropping_matches() {
    // Schema has no status-like column at all; the rows still carry a
    // select value under a name the schema does not list (stale schema).
    let db = id(1);
    let mut mock = MockNotion::new();
    mock.databases.insert(
        db.clone(),
        database(
            &db,
            "Tracker",
            &[
                ("Nội dung công việc", PropertyKind::Title),
                ("Deadline dự kiến", PropertyKind::Date),
            ],
        ),
    );
    mock.row_pages = vec![vec![
        row(
            1,
            vec![
                ("Nội dung công việc", title_value("kept")),
                ("Tình trạng", select_value("đang  THỰC  hiện")),
            ],
        ),
        row(
            2,
            vec![
                ("Nội dung công việc", title_value("dropped")),
                ("Tình trạng", select_value("Hoàn thành")),
            ],
        ),
    ]];

    let schema = mock.databases.get(&db).unwrap().properties.clone();
    let columns = ResolvedColumns::probe_all(&schema, None);
    let plan = build_filter_plan(
        &columns,
        Some("Đang thực hiện"),
        QueryIntent::Overdue,
        today(),
    );
    assert!(plan.needs_client_filter);

    let rows = plan_and_fetch(&mock, &db, &plan).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id(0x1000_0000 + 1));

    // only the deadline clause went to the server
    let filters = mock.seen_filters.lock().unwrap().clone();
    let sent = filters[0].as_ref().unwrap();
    assert_eq!(sent["and"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn rejected_filter_degrades_to_unfiltered_fetch_with_client_predicates() {
    let db = id(1);
    let mut mock = MockNotion::new();
    mock.databases.insert(
        db.clone(),
        database(
            &db,
            "Tracker",
            &[
                ("Nội dung công việc", PropertyKind::Title),
                ("Deadline dự kiến", PropertyKind::Date),
                ("Trạng thái", PropertyKind::Status),
            ],
        ),
    );
    mock.reject_filtered_queries = true;
    mock.row_pages = vec![vec![
        row(
            1,
            vec![
                ("Nội dung công việc", title_value("overdue, in progress")),
                ("Deadline dự kiến", date_value("2000-01-01")),
                (
                    "Trạng thái",
                    notion2mail::PropertyTypeValue::Status {
                        status: Some(notion2mail::SelectOption {
                            id: None,
                            name: "Đang thực hiện".to_string(),
                        }),
                    },
                ),
            ],
        ),
        row(
            2,
            vec![
                ("Nội dung công việc", title_value("wrong status")),
                ("Deadline dự kiến", date_value("2000-01-01")),
                ("Trạng thái", select_value("Hoàn thành")),
            ],
        ),
        row(
            3,
            vec![
                ("Nội dung công việc", title_value("future deadline")),
                ("Deadline dự kiến", date_value("2999-01-01")),
                (
                    "Trạng thái",
                    notion2mail::PropertyTypeValue::Status {
                        status: Some(notion2mail::SelectOption {
                            id: None,
                            name: "Đang thực hiện".to_string(),
                        }),
                    },
                ),
            ],
        ),
    ]];

    let schema = mock.databases.get(&db).unwrap().properties.clone();
    let columns = ResolvedColumns::probe_all(&schema, None);
    let plan = build_filter_plan(
        &columns,
        Some("Đang thực hiện"),
        QueryIntent::Overdue,
        today(),
    );
    assert!(plan.server_filter().is_some());

    let rows = plan_and_fetch(&mock, &db, &plan).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id(0x1000_0000 + 1));

    // first attempt carried the filter, the retry did not
    let filters = mock.seen_filters.lock().unwrap().clone();
    assert!(filters[0].is_some());
    assert!(filters[1].is_none());
}

#[tokio::test]
async fn report_succeeds_via_type_fallback_on_unconventional_schema() {
    // The only status-like column is named "Tiến độ" (not in the candidate
    // list) and typed select; status_equals is unset. The report still
    // shows the column's raw text through the type-fallback path.
    let db = id(1);
    let mut mock = MockNotion::new();
    mock.databases.insert(
        db.clone(),
        database(
            &db,
            "Kế hoạch quý",
            &[
                ("Nội dung công việc", PropertyKind::Title),
                ("Deadline dự kiến", PropertyKind::Date),
                ("Tiến độ", PropertyKind::Select),
            ],
        ),
    );
    mock.row_pages = vec![vec![row(
        1,
        vec![
            ("Nội dung công việc", title_value("Hoàn thiện hồ sơ")),
            ("Deadline dự kiến", date_value("2000-01-01")),
            ("Tiến độ", select_value("Làm chậm")),
        ],
    )]];

    let report = process_database(&mock, &db, &target(None)).await.unwrap();

    assert_eq!(report.title, "Kế hoạch quý");
    assert_eq!(report.overdue.len(), 1);
    assert_eq!(report.overdue[0].status, "Làm chậm");
    assert_eq!(report.overdue[0].deadline, "2000-01-01");
    assert!(report.html.contains("Làm chậm"));
    assert!(report.html.contains("Hoàn thiện hồ sơ"));
}

#[tokio::test]
async fn status_operator_key_follows_column_type() {
    let db = id(1);
    let mut mock = MockNotion::new();
    mock.databases.insert(
        db.clone(),
        database(
            &db,
            "Tracker",
            &[
                ("Name", PropertyKind::Title),
                ("Status", PropertyKind::Status),
            ],
        ),
    );
    mock.row_pages = vec![vec![]];

    let schema = mock.databases.get(&db).unwrap().properties.clone();
    let columns = ResolvedColumns::probe_all(&schema, None);
    let plan = build_filter_plan(
        &columns,
        Some("Đang thực hiện"),
        QueryIntent::InProgress,
        today(),
    );

    plan_and_fetch(&mock, &db, &plan).await.unwrap();

    let filters = mock.seen_filters.lock().unwrap().clone();
    let sent = filters[0].as_ref().unwrap();
    let clause = &sent["and"].as_array().unwrap()[0];
    assert!(clause.get("status").is_some());
    assert!(clause.get("select").is_none());
}
