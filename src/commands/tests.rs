use std::fs;
use std::path::Path;

use tempfile::TempDir;

use super::*;
use crate::cli::{DesignedFlag, InitArgs, StatusArgs, SubmitArgs};
use crate::commands::docs::write_document_list;
use crate::commands::show::build_response;
use crate::commands::status::document_progress;
use crate::error::LabelError;
use crate::model::HumanLabel;
use crate::store::UpsertOutcome;

fn write_corpus(data_dir: &Path) {
    fs::create_dir_all(data_dir).expect("create data dir");
    fs::write(
        data_dir.join("docs_out.csv"),
        "doc_id,document\nd1,The bridge opened in 1932.\nd2,Rivers flow downhill.\n",
    )
    .expect("write docs");
    fs::write(
        data_dir.join("qrc_out.csv"),
        "doc_id,q_id,is_confusing,question,response,confusion,is_defused\n\
         d1,1,no,When did the bridge open?,In 1932.,no,no\n\
         d1,2,yes,Why did the bridge open in 1850?,It opened in 1932.,yes,yes\n\
         d2,1,no,Which way do rivers flow?,Downhill.,no,no\n",
    )
    .expect("write qrc");
}

fn session_args(root: &Path) -> SessionArgs {
    SessionArgs {
        data_dir: root.join("topic-a"),
        out_dir: root.join("labels"),
        annotator: "alice".to_string(),
        experiment: Some("exp1".to_string()),
    }
}

fn submit_args(root: &Path, q_id: &str, confusing: HumanLabel) -> SubmitArgs {
    SubmitArgs {
        session: session_args(root),
        doc_id: "d1".to_string(),
        q_id: Some(q_id.to_string()),
        is_confusing: None,
        question: None,
        confusing,
        defused: HumanLabel::No,
        categories: Vec::new(),
        other_text: None,
    }
}

fn initialized(root: &Path) {
    write_corpus(&root.join("topic-a"));
    init::run(InitArgs {
        session: session_args(root),
        create: true,
        no_create: false,
    })
    .expect("init should create the labels table");
}

#[test]
fn workspace_is_blocked_until_labels_table_is_created() {
    let dir = TempDir::new().expect("temp dir");
    write_corpus(&dir.path().join("topic-a"));

    let err = init::run(InitArgs {
        session: session_args(dir.path()),
        create: false,
        no_create: false,
    })
    .expect_err("init without --create must block");
    assert!(matches!(
        err.downcast_ref::<LabelError>(),
        Some(LabelError::StoreNotReady { .. })
    ));

    let err = open_workspace(&session_args(dir.path())).err().expect("must block");
    assert!(matches!(
        err.downcast_ref::<LabelError>(),
        Some(LabelError::StoreNotReady { .. })
    ));
}

#[test]
fn declining_creation_blocks_and_writes_nothing() {
    let dir = TempDir::new().expect("temp dir");
    write_corpus(&dir.path().join("topic-a"));

    let err = init::run(InitArgs {
        session: session_args(dir.path()),
        create: false,
        no_create: true,
    })
    .expect_err("declined init must block");

    assert!(matches!(
        err.downcast_ref::<LabelError>(),
        Some(LabelError::StoreNotReady { .. })
    ));
    assert!(!dir.path().join("labels").exists());
}

#[test]
fn submitting_every_question_marks_document_complete_after_reload() {
    let dir = TempDir::new().expect("temp dir");
    initialized(dir.path());

    let mut workspace = open_workspace(&session_args(dir.path())).expect("workspace");
    let (outcome, completeness) =
        submit::submit(&mut workspace, &submit_args(dir.path(), "1", HumanLabel::No))
            .expect("first submission");
    assert_eq!(outcome, UpsertOutcome::Created);
    assert_eq!(completeness.remaining.len(), 1);

    let mut second = submit_args(dir.path(), "2", HumanLabel::Yes);
    second.is_confusing = Some(DesignedFlag::Yes);
    second.categories = vec!["false premise".to_string()];
    submit::submit(&mut workspace, &second).expect("second submission");

    let reloaded = open_workspace(&session_args(dir.path())).expect("reload");
    let expected = reloaded.corpus.expected_keys("d1");
    let completeness = reloaded.store.completeness("d1", &expected);
    assert!(completeness.remaining.is_empty());
    assert!(completeness.is_complete());
    assert_eq!(completeness.done.len(), 2);

    let row = reloaded
        .store
        .table()
        .get(&crate::model::AnnotationKey::new("d1", "2", "yes"))
        .expect("second row stored");
    assert_eq!(row.llm_confuse_label, "yes");
    assert_eq!(row.llm_defuse_label, "yes");
    assert_eq!(row.question_category, "false premise");
}

#[test]
fn resubmitting_overwrites_without_growing_the_table() {
    let dir = TempDir::new().expect("temp dir");
    initialized(dir.path());
    let mut workspace = open_workspace(&session_args(dir.path())).expect("workspace");

    submit::submit(&mut workspace, &submit_args(dir.path(), "1", HumanLabel::No)).expect("first");
    let (outcome, _) =
        submit::submit(&mut workspace, &submit_args(dir.path(), "1", HumanLabel::Yes))
            .expect("second");

    assert_eq!(outcome, UpsertOutcome::Overwritten);
    assert_eq!(workspace.store.table().len(), 1);
    assert_eq!(
        workspace.store.table().rows()[0].human_confuse_label,
        HumanLabel::Yes
    );
}

#[test]
fn other_category_without_text_is_rejected_before_writing() {
    let dir = TempDir::new().expect("temp dir");
    initialized(dir.path());
    let mut workspace = open_workspace(&session_args(dir.path())).expect("workspace");
    let labels_path = workspace.session.labels_path();
    let before = fs::read_to_string(&labels_path).expect("read table");

    let mut args = submit_args(dir.path(), "1", HumanLabel::Yes);
    args.categories = vec!["Other".to_string()];
    let err = submit::submit(&mut workspace, &args).expect_err("must reject");

    assert!(matches!(
        err.downcast_ref::<LabelError>(),
        Some(LabelError::InvalidCategorySelection(_))
    ));
    assert!(workspace.store.table().is_empty());
    assert_eq!(fs::read_to_string(&labels_path).expect("read table"), before);
}

#[test]
fn submission_can_target_display_position() {
    let dir = TempDir::new().expect("temp dir");
    initialized(dir.path());
    let mut workspace = open_workspace(&session_args(dir.path())).expect("workspace");
    let view = build_response(&workspace, "d1").expect("view");

    let mut args = submit_args(dir.path(), "1", HumanLabel::Yes);
    args.q_id = None;
    args.question = Some(2);
    submit::submit(&mut workspace, &args).expect("submit by position");

    let view_after = build_response(&workspace, "d1").expect("view");
    assert!(view_after.questions[1].annotation.is_some());
    assert!(view_after.questions[0].annotation.is_none());
    assert_eq!(view_after.questions[1].q_id, view.questions[1].q_id);
    assert_eq!(view_after.remaining, 1);
}

#[test]
fn show_lists_questions_with_positions() {
    let dir = TempDir::new().expect("temp dir");
    initialized(dir.path());
    let workspace = open_workspace(&session_args(dir.path())).expect("workspace");

    let view = build_response(&workspace, "d1").expect("view");
    assert_eq!(view.expected, 2);
    assert_eq!(
        view.questions.iter().map(|q| q.position).collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert!(!view.complete);
    assert!(build_response(&workspace, "nope").is_err());
}

#[test]
fn document_list_marks_completed_documents() {
    let dir = TempDir::new().expect("temp dir");
    initialized(dir.path());
    let mut workspace = open_workspace(&session_args(dir.path())).expect("workspace");

    let mut args = submit_args(dir.path(), "1", HumanLabel::No);
    args.doc_id = "d2".to_string();
    submit::submit(&mut workspace, &args).expect("submit d2");

    let progress = document_progress(&workspace.corpus, &workspace.store);
    let mut rendered = Vec::new();
    write_document_list(&mut rendered, &progress).expect("render");
    let rendered = String::from_utf8(rendered).expect("utf8");

    assert!(rendered.contains("  d1 (0/2 annotated, 2 remaining)"));
    assert!(rendered.contains("✓ d2 (1/1 annotated, 0 remaining)"));
}

#[test]
fn filter_file_never_marks_unlisted_documents_complete() {
    let dir = TempDir::new().expect("temp dir");
    initialized(dir.path());
    fs::write(
        dir.path().join("topic-a").join("qrc_filter.csv"),
        "doc_id,q_id,is_confusing,question,response,confusion,is_defused\n\
         d1,1,no,When did the bridge open?,In 1932.,no,no\n",
    )
    .expect("write filter");

    let workspace = open_workspace(&session_args(dir.path())).expect("workspace");
    let progress = document_progress(&workspace.corpus, &workspace.store);

    assert_eq!(progress[0].expected, 2);
    assert_eq!(progress[1].doc_id, "d2");
    assert_eq!(progress[1].expected, 1);
    assert!(!progress[1].complete);
}

#[test]
fn status_writes_progress_report() {
    let dir = TempDir::new().expect("temp dir");
    initialized(dir.path());
    let report_path = dir.path().join("reports").join("progress.json");

    status::run(StatusArgs {
        session: session_args(dir.path()),
        report_path: Some(report_path.clone()),
    })
    .expect("status");

    let raw = fs::read_to_string(&report_path).expect("read report");
    let report: serde_json::Value = serde_json::from_str(&raw).expect("parse report");
    assert_eq!(report["annotator"], "alice");
    assert_eq!(report["experiment"], "exp1");
    assert_eq!(report["document_count"], 2);
    assert_eq!(report["complete_document_count"], 0);
    assert_eq!(report["documents"][0]["remaining"], 2);
}
