use crate::{Effect, ExportState, Msg, Stage};

/// Pure update function: applies a message to the export state and returns
/// the effects to run next.
///
/// Messages that do not fit the current stage are ignored, and nothing moves
/// once the export has reached a terminal stage.
pub fn update(mut state: ExportState, msg: Msg) -> (ExportState, Vec<Effect>) {
    if state.is_terminal() {
        return (state, Vec::new());
    }

    let effects = match (state.stage(), msg) {
        (_, Msg::StageFailed { reason }) => {
            state.stop(Stage::Failed, Some(reason));
            Vec::new()
        }
        (_, Msg::CancelRequested) => {
            state.stop(Stage::Cancelled, None);
            Vec::new()
        }
        (Stage::Fetching, Msg::HtmlFetched) => {
            state.advance_to(Stage::Fetched);
            vec![Effect::ExtractContent]
        }
        (Stage::Fetched, Msg::ContentExtracted { block_count }) => {
            state.set_block_count(block_count);
            state.advance_to(Stage::Extracted);
            vec![Effect::RenderMarkdown]
        }
        (Stage::Extracted, Msg::MarkdownRendered { image_count }) => {
            state.set_images_expected(image_count);
            state.advance_to(Stage::Rendered);
            vec![Effect::ResolveImages]
        }
        (Stage::Rendered, Msg::ImagesResolved { resolved, dropped }) => {
            state.set_image_outcome(resolved, dropped);
            state.advance_to(Stage::ImagesResolved);
            vec![Effect::WriteDocument]
        }
        (Stage::ImagesResolved, Msg::DocumentWritten) => {
            state.advance_to(Stage::Written);
            Vec::new()
        }
        _ => Vec::new(),
    };

    (state, effects)
}
