use crate::error::{LabelError, LabelResult};

/// Tag that stands in for annotator-supplied free text.
pub const OTHER_TAG: &str = "Other";

const SEPARATOR: &str = ", ";

/// Builds the `question_category` column from the selected tags, replacing
/// the `Other` tag with `other_text`.
pub fn category_column(tags: &[String], other_text: Option<&str>) -> LabelResult<String> {
    let other_text = other_text.map(str::trim).filter(|text| !text.is_empty());
    let mut selected: Vec<String> = Vec::with_capacity(tags.len());
    let mut other_selected = false;

    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(LabelError::InvalidCategorySelection(
                "category tags must not be blank".to_string(),
            ));
        }
        if tag.contains(',') {
            return Err(LabelError::InvalidCategorySelection(format!(
                "category tag {tag:?} must not contain a comma"
            )));
        }

        let value = if tag.eq_ignore_ascii_case(OTHER_TAG) {
            other_selected = true;
            match other_text {
                Some(text) => text.to_string(),
                None => {
                    return Err(LabelError::InvalidCategorySelection(format!(
                        "{OTHER_TAG} selected without free text"
                    )));
                }
            }
        } else {
            tag.to_string()
        };

        if !selected.contains(&value) {
            selected.push(value);
        }
    }

    if other_text.is_some() && !other_selected {
        return Err(LabelError::InvalidCategorySelection(format!(
            "free text given without selecting {OTHER_TAG}"
        )));
    }

    Ok(selected.join(SEPARATOR))
}
