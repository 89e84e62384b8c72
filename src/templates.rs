use askama::Template;

/// Page shell: hosts the container that screens are swapped into.
#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
  /// Empty when the page carries the error screen and no live session.
  pub session: String,
  /// Already rendered screen markup.
  pub screen: String,
}

#[derive(Template)]
#[template(path = "loading.html")]
pub struct LoadingTemplate;

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate;

#[derive(Template)]
#[template(path = "question.html")]
pub struct QuestionTemplate {
  pub timer: String,
  pub index: usize,
  pub number: usize,
  pub text: String,
  pub options: Vec<OptionView>,
  pub can_advance: bool,
  pub advance_label: &'static str,
}

#[derive(Template)]
#[template(path = "results.html")]
pub struct ResultsTemplate {
  pub counters: Vec<CounterView>,
  pub show_details: bool,
  pub blocks: Vec<BlockView>,
}

pub struct OptionView {
  pub text: String,
  pub class: &'static str,
}

pub struct CounterView {
  pub id: String,
  pub label: &'static str,
  pub count: usize,
  pub active: bool,
}

pub struct BlockView {
  pub number: usize,
  pub text: String,
  pub class: &'static str,
  pub options: Vec<OptionView>,
}
