//! Authoring affordance for pages: editable data attributes, rendered editable
//! elements and the script tag bootstrapping the editor.

use crate::biz::inline::content::ContentProvider;
use crate::config::config::InlineEditingSetting;
use access_control::checker::PermissionChecker;
use anyhow::anyhow;
use app_error::AppError;
use askama::Template;
use database_entity::dto::ContentKey;

#[derive(Template)]
#[template(
  source = r#" data-inline-name="{{ name }}" data-inline-namespace="{{ namespace }}" data-inline-locale="{{ locale }}""#,
  ext = "html"
)]
struct EditableAttributes<'a> {
  name: &'a str,
  namespace: &'a str,
  locale: &'a str,
}

#[derive(Template)]
#[template(
  source = r#"<{{ tag|safe }}{% if let Some(attributes) = attributes %}{{ attributes|safe }}{% endif %}>{{ content|safe }}</{{ tag|safe }}>"#,
  ext = "html"
)]
struct EditableElement<'a> {
  tag: &'a str,
  attributes: Option<String>,
  content: &'a str,
}

#[derive(Template)]
#[template(
  source = r#"<script src="{{ assets_url|safe }}/inline.js" id="inline-editing-source" data-source-css="{{ assets_url|safe }}/inline.css" data-source-tinymce-js="{{ assets_url|safe }}/tinymce/tinymce.min.js" data-source-gateway-url="{{ gateway_url|safe }}"></script>"#,
  ext = "html"
)]
struct SourceScript<'a> {
  assets_url: &'a str,
  gateway_url: &'a str,
}

fn render<T: Template>(template: &T) -> Result<String, AppError> {
  template
    .render()
    .map_err(|err| AppError::Internal(anyhow!("failed to render inline markup: {}", err)))
}

/// Data attributes marking the slot as editable, or `None` when the viewer may not edit it.
pub fn editable_attributes(
  checker: &PermissionChecker,
  key: &ContentKey,
) -> Result<Option<String>, AppError> {
  if !checker.is_item_editation_allowed(&key.namespace, &key.locale, &key.name) {
    return Ok(None);
  }
  render(&EditableAttributes {
    name: &key.name,
    namespace: &key.namespace,
    locale: &key.locale,
  })
  .map(Some)
}

/// Render `<tag ...>content</tag>` for a slot. The stored content is html and is not escaped.
pub async fn render_element(
  tag: &str,
  key: &ContentKey,
  checker: &PermissionChecker,
  content_provider: &ContentProvider,
) -> Result<String, AppError> {
  if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
    return Err(AppError::InvalidRequest(format!(
      "{} is not a valid element name",
      tag
    )));
  }
  let content = content_provider.get_content(key).await?;
  render(&EditableElement {
    tag,
    attributes: editable_attributes(checker, key)?,
    content: &content,
  })
}

/// Script tag loading the editor, rendered only for viewers allowed to edit.
pub fn source_script(
  checker: &PermissionChecker,
  setting: &InlineEditingSetting,
) -> Result<Option<String>, AppError> {
  if !checker.is_global_editation_allowed() {
    return Ok(None);
  }
  let assets_url = setting.assets_url();
  render(&SourceScript {
    assets_url: &assets_url,
    gateway_url: &setting.url,
  })
  .map(Some)
}
