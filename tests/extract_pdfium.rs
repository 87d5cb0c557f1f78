//! Text extraction against a real pdfium library.
//!
//! Gated behind `PDFIUM_TESTS` because pdfium is a native library that is
//! not present on every machine. Run with:
//!   PDFIUM_TESTS=1 PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test extract_pdfium -- --nocapture

mod support;

use notes2quiz::pipeline::extract::TextExtractor;
use notes2quiz::{
    GenerationPrompt, QuestionItem, QuizConfig, QuizError, QuizMode, QuizRequest, RawModelReply,
    ReplyGenerator, StudyPipeline, UploadRequest,
};
use support::{pdf_with_pages, pdfium_enabled};

const PAGE_ONE: &str = "Photosynthesis converts light to energy.";
const PAGE_TWO: &str = "Mitochondria produce ATP.";

fn config() -> QuizConfig {
    config_with_budget(4000)
}

fn config_with_budget(max_chars: usize) -> QuizConfig {
    let mut builder = QuizConfig::builder().max_chars(max_chars);
    if let Ok(path) = std::env::var("PDFIUM_LIB_PATH") {
        builder = builder.pdfium_lib_path(path);
    }
    builder.build().unwrap()
}

#[tokio::test]
async fn two_pages_keep_order_and_count() {
    if !pdfium_enabled() {
        return;
    }
    let extractor = TextExtractor::new(&config());
    let doc = extractor
        .extract(pdf_with_pages(&[PAGE_ONE, PAGE_TWO]))
        .await
        .unwrap();

    assert_eq!(doc.page_count(), 2);
    assert!(doc.pages()[0].contains("Photosynthesis"), "{:?}", doc.pages());
    assert!(doc.pages()[1].contains("Mitochondria"), "{:?}", doc.pages());

    let text = doc.full_text();
    let first = text.find("Photosynthesis").unwrap();
    let second = text.find("Mitochondria").unwrap();
    assert!(first < second);
    assert!(text.ends_with('\n'));
    assert_eq!(text.matches('\n').count(), 2);
}

#[tokio::test]
async fn long_document_is_truncated_to_budget() {
    if !pdfium_enabled() {
        return;
    }
    let line = "Cells are the basic unit of life and every organism is made of them.";
    let pages: Vec<&str> = std::iter::repeat(line).take(80).collect();
    let doc = TextExtractor::new(&config_with_budget(1000))
        .extract(pdf_with_pages(&pages))
        .await
        .unwrap();

    assert_eq!(doc.page_count(), 80);
    assert!(doc.is_truncated());
    let cut = doc.truncated_text();
    assert_eq!(cut.chars().count(), 1000);
    assert!(doc.full_text().starts_with(&cut));
}

#[tokio::test]
async fn zero_page_document_is_empty() {
    if !pdfium_enabled() {
        return;
    }
    let err = TextExtractor::new(&config())
        .extract(pdf_with_pages(&[]))
        .await
        .unwrap_err();
    assert!(matches!(err, QuizError::EmptyDocument), "{err:?}");
    assert!(err.is_document_parse());
}

#[tokio::test]
async fn corrupt_pdf_is_a_parse_error() {
    if !pdfium_enabled() {
        return;
    }
    let err = TextExtractor::new(&config())
        .extract(b"%PDF-1.4\nthis is not really a pdf".to_vec())
        .await
        .unwrap_err();
    assert!(err.is_document_parse(), "{err:?}");
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn upload_with_leading_line_break_is_extracted() {
    if !pdfium_enabled() {
        return;
    }
    let mut bytes = b"\r\n".to_vec();
    bytes.extend(pdf_with_pages(&[PAGE_ONE, PAGE_TWO]));

    let pipeline = StudyPipeline::with_generator(config(), ConformantModel(1));
    let set = pipeline
        .run(UploadRequest::new(bytes).quiz_mode("MCQ").question_count("1"))
        .await
        .unwrap();
    assert_eq!(set.document().unwrap().quiz.len(), 1);
}

/// Answers with a conformant MCQ reply of `.0` questions.
struct ConformantModel(usize);

impl ReplyGenerator for ConformantModel {
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<RawModelReply, QuizError> {
        assert!(prompt.as_str().contains(PAGE_TWO));
        let quiz: Vec<_> = (0..self.0)
            .map(|i| {
                serde_json::json!({
                    "question": format!("Q{i}"),
                    "options": ["light", "water", "ATP", "DNA"],
                    "answer": "light"
                })
            })
            .collect();
        let cards: Vec<_> = (0..10)
            .map(|i| serde_json::json!({"front": format!("F{i}"), "back": format!("B{i}")}))
            .collect();
        Ok(RawModelReply::new(
            serde_json::json!({"quiz": quiz, "flashcards": cards}).to_string(),
        ))
    }
}

#[tokio::test]
async fn upload_to_study_set_end_to_end() {
    if !pdfium_enabled() {
        return;
    }
    let pipeline = StudyPipeline::with_generator(config(), ConformantModel(3));
    let upload = UploadRequest::new(pdf_with_pages(&[PAGE_ONE, PAGE_TWO]))
        .quiz_mode("MCQ")
        .question_count("3");
    assert_eq!(upload.quiz_request(), QuizRequest::new(QuizMode::Mcq, 3));

    let set = pipeline.run(upload).await.unwrap();
    let doc = set.document().unwrap();
    assert_eq!(doc.quiz.len(), 3);
    assert!(doc
        .quiz
        .iter()
        .all(|q| matches!(q, QuestionItem::MultipleChoice { options, .. } if options.len() == 4)));
    assert_eq!(doc.flashcards.len(), 10);
}
