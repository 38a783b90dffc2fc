//! Client-side checks for the upload form of the chooser step.

use contracts::usecases::u001_stream_chooser::response::ChooserStepData;

/// Error markers the title field already shows.
///
/// `message_shown` is also true for a message rendered by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TitleFieldErrors {
    pub invalid: bool,
    pub message_shown: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadCheck {
    /// Send the form.
    Submit,
    /// Keep the form. Each flag is false when the field already shows that
    /// marker or there is no title field at all.
    Reject {
        mark_field: bool,
        append_message: bool,
    },
}

/// Validate the title before any network call.
///
/// `title` is `None` when the form has no title field at all.
pub fn check_title(title: Option<&str>, field: TitleFieldErrors) -> UploadCheck {
    match title {
        Some(title) if !title.trim().is_empty() => UploadCheck::Submit,
        Some(_) => UploadCheck::Reject {
            mark_field: !field.invalid,
            append_message: !field.message_shown,
        },
        None => UploadCheck::Reject {
            mark_field: false,
            append_message: false,
        },
    }
}

/// Bare file name without directories and the final extension.
///
/// Browsers report a picked file as `C:\fakepath\clip.mp4`, so both
/// separators are stripped. A name that is only an extension stays whole.
pub fn title_from_file_path(path: &str) -> String {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match name.rfind('.') {
        Some(dot) if dot > 0 => name[..dot].to_string(),
        _ => name.to_string(),
    }
}

/// Inline error panel shown under the upload form after a failed POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadErrorPanel {
    pub label: String,
    pub message: String,
    pub detail: String,
}

impl UploadErrorPanel {
    pub fn new(step: &ChooserStepData, detail: impl Into<String>) -> Self {
        Self {
            label: step.error_label.clone(),
            message: step.error_message.clone(),
            detail: detail.into(),
        }
    }

    /// Text of the bold heading, `"{label}: "`.
    pub fn heading(&self) -> String {
        format!("{}: ", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_title() {
        let clean = TitleFieldErrors::default();
        assert_eq!(check_title(Some("Clip"), clean), UploadCheck::Submit);
        assert_eq!(
            check_title(Some("   "), clean),
            UploadCheck::Reject {
                mark_field: true,
                append_message: true
            }
        );
        assert_eq!(
            check_title(None, clean),
            UploadCheck::Reject {
                mark_field: false,
                append_message: false
            }
        );
    }

    #[test]
    fn test_second_empty_submit_adds_no_message() {
        let first = check_title(Some(""), TitleFieldErrors::default());
        let UploadCheck::Reject {
            mark_field,
            append_message,
        } = first
        else {
            panic!("empty title must be rejected");
        };
        // The field as the first rejection left it.
        let after_first = TitleFieldErrors {
            invalid: mark_field,
            message_shown: append_message,
        };
        assert_eq!(
            check_title(Some(""), after_first),
            UploadCheck::Reject {
                mark_field: false,
                append_message: false
            }
        );
    }

    #[test]
    fn test_server_rendered_message_is_not_repeated() {
        let field = TitleFieldErrors {
            invalid: false,
            message_shown: true,
        };
        assert_eq!(
            check_title(Some(""), field),
            UploadCheck::Reject {
                mark_field: true,
                append_message: false
            }
        );
    }

    #[test]
    fn test_title_from_windows_fakepath() {
        assert_eq!(title_from_file_path("C:\\fakepath\\holiday.mp4"), "holiday");
    }

    #[test]
    fn test_title_from_unix_path() {
        assert_eq!(title_from_file_path("/home/user/clip.final.mov"), "clip.final");
        assert_eq!(title_from_file_path("a/b\\c.webm"), "c");
    }

    #[test]
    fn test_title_without_extension() {
        assert_eq!(title_from_file_path("recording"), "recording");
        assert_eq!(title_from_file_path(".mp4"), ".mp4");
        assert_eq!(title_from_file_path(""), "");
    }

    #[test]
    fn test_error_panel_uses_step_labels() {
        let panel = UploadErrorPanel::new(&ChooserStepData::default(), "500 Internal Server Error");
        assert_eq!(panel.heading(), "Server Error: ");
        assert_eq!(
            panel.message,
            "Report this error to the server owner with the following:"
        );
        assert_eq!(panel.detail, "500 Internal Server Error");
    }
}
