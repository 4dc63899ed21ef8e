use std::sync::Once;

use article_core::{update, Effect, ExportState, Msg, Stage};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(export_logging::initialize_for_tests);
}

fn run(state: ExportState, msgs: Vec<Msg>) -> (ExportState, Vec<Effect>) {
    let mut state = state;
    let mut all_effects = Vec::new();
    for msg in msgs {
        let (next, effects) = update(state, msg);
        state = next;
        all_effects.extend(effects);
    }
    (state, all_effects)
}

#[test]
fn happy_path_walks_every_stage_in_order() {
    init_logging();
    let (state, effects) = run(
        ExportState::new(),
        vec![
            Msg::HtmlFetched,
            Msg::ContentExtracted { block_count: 4 },
            Msg::MarkdownRendered { image_count: 3 },
            Msg::ImagesResolved {
                resolved: 2,
                dropped: 1,
            },
            Msg::DocumentWritten,
        ],
    );

    assert_eq!(state.stage(), Stage::Written);
    assert!(state.is_terminal());
    assert_eq!(state.block_count(), 4);
    assert_eq!(state.images_expected(), 3);
    assert_eq!(state.images_resolved(), 2);
    assert_eq!(state.images_dropped(), 1);
    assert_eq!(state.failure(), None);
    assert_eq!(
        effects,
        vec![
            Effect::ExtractContent,
            Effect::RenderMarkdown,
            Effect::ResolveImages,
            Effect::WriteDocument,
        ]
    );
}

#[test]
fn out_of_order_messages_are_ignored() {
    init_logging();
    let state = ExportState::new();
    let (next, effects) = update(state.clone(), Msg::DocumentWritten);

    assert_eq!(next, state);
    assert!(effects.is_empty());

    let (next, _) = update(next, Msg::HtmlFetched);
    let (after, effects) = update(next.clone(), Msg::MarkdownRendered { image_count: 1 });
    assert_eq!(after, next);
    assert!(effects.is_empty());
}

#[test]
fn extraction_failure_is_terminal_and_remembers_stage() {
    init_logging();
    let (state, effects) = run(
        ExportState::new(),
        vec![
            Msg::HtmlFetched,
            Msg::StageFailed {
                reason: "no article content found".to_string(),
            },
        ],
    );

    assert_eq!(state.stage(), Stage::Failed);
    assert_eq!(state.failed_at(), Some(Stage::Fetched));
    assert_eq!(state.failure(), Some("no article content found"));
    assert_eq!(effects, vec![Effect::ExtractContent]);

    let (after, effects) = update(state.clone(), Msg::ContentExtracted { block_count: 1 });
    assert_eq!(after, state);
    assert!(effects.is_empty());
}

#[test]
fn cancel_stops_before_next_stage() {
    init_logging();
    let (state, effects) = run(
        ExportState::new(),
        vec![
            Msg::HtmlFetched,
            Msg::ContentExtracted { block_count: 2 },
            Msg::CancelRequested,
            Msg::MarkdownRendered { image_count: 0 },
        ],
    );

    assert_eq!(state.stage(), Stage::Cancelled);
    assert_eq!(state.failed_at(), Some(Stage::Extracted));
    assert_eq!(effects, vec![Effect::ExtractContent, Effect::RenderMarkdown]);
}

#[test]
fn written_export_ignores_late_failures() {
    init_logging();
    let (state, _) = run(
        ExportState::new(),
        vec![
            Msg::HtmlFetched,
            Msg::ContentExtracted { block_count: 1 },
            Msg::MarkdownRendered { image_count: 0 },
            Msg::ImagesResolved {
                resolved: 0,
                dropped: 0,
            },
            Msg::DocumentWritten,
            Msg::StageFailed {
                reason: "late".to_string(),
            },
        ],
    );

    assert_eq!(state.stage(), Stage::Written);
    assert_eq!(state.failure(), None);
}
