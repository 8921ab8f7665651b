//! Форма поста: разбор `multipart/form-data`, проверка полей и описание
//! полей для шаблона.

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use validator::{Validate, ValidationError};

use crate::domain::error::DomainError;
use crate::domain::group::Group;
use crate::domain::post::{ImageUpload, Post, PostInput};
use crate::presentation::http::app_error::{AppError, AppResult};
use crate::presentation::http::views::media_path;

const REQUIRED_FIELD: &str = "Обязательное поле.";
const INVALID_CHOICE: &str = "Выберите корректный вариант.";
const INVALID_IMAGE: &str =
    "Загрузите правильное изображение. Файл, который вы загрузили, поврежден или не является изображением.";
const EMPTY_CHOICE_LABEL: &str = "---------";

#[derive(Debug, Clone)]
pub(crate) struct UploadedFile {
    pub(crate) file_name: String,
    pub(crate) bytes: Vec<u8>,
}

/// Поля, пришедшие в форме. Незнакомые поля (например, `author`) игнорируются.
#[derive(Debug, Clone, Default, Validate)]
pub(crate) struct PostFormData {
    #[validate(custom(function = "not_blank"))]
    pub(crate) text: String,
    pub(crate) group: String,
    pub(crate) image: Option<UploadedFile>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Ошибки по полям формы; показываются рядом с полями при повторном рендере.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FormErrors {
    pub(crate) text: Option<String>,
    pub(crate) group: Option<String>,
    pub(crate) image: Option<String>,
}

impl FormErrors {
    pub(crate) fn is_empty(&self) -> bool {
        self.text.is_none() && self.group.is_none() && self.image.is_none()
    }

    /// Ошибка проверки из сервиса, привязанная к полю формы.
    /// Для остальных ошибок возвращает их обратно.
    pub(crate) fn from_domain(err: DomainError) -> Result<Self, DomainError> {
        let DomainError::Validation { field, .. } = err else {
            return Err(err);
        };
        let mut errors = Self::default();
        match field {
            "text" => errors.text = Some(REQUIRED_FIELD.to_string()),
            "group" => errors.group = Some(INVALID_CHOICE.to_string()),
            "image" => errors.image = Some(INVALID_IMAGE.to_string()),
            _ => return Err(err),
        }
        Ok(errors)
    }
}

impl PostFormData {
    pub(crate) async fn read(multipart: &mut Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "text" => form.text = field.text().await.map_err(multipart_error)?,
                "group" => form.group = field.text().await.map_err(multipart_error)?,
                "image" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    if !bytes.is_empty() {
                        form.image = Some(UploadedFile {
                            file_name,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Превращает форму в ввод сервиса или собирает ошибки всех полей сразу.
    pub(crate) fn to_input(&self) -> Result<PostInput, FormErrors> {
        let mut errors = FormErrors::default();

        if self.validate().is_err() {
            errors.text = Some(REQUIRED_FIELD.to_string());
        }

        let group_id = match self.group.trim() {
            "" => None,
            raw => match raw.parse::<i64>() {
                Ok(id) if id > 0 => Some(id),
                _ => {
                    errors.group = Some(INVALID_CHOICE.to_string());
                    None
                }
            },
        };

        let image = match &self.image {
            None => None,
            Some(file) => match ImageUpload::new(file.file_name.clone(), file.bytes.clone()) {
                Ok(image) => Some(image),
                Err(_) => {
                    errors.image = Some(INVALID_IMAGE.to_string());
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(PostInput {
            text: self.text.clone(),
            group_id,
            image,
        })
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::BadRequest(err.body_text())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TextField {
    pub(crate) value: String,
    pub(crate) error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Choice {
    pub(crate) value: String,
    pub(crate) label: String,
    pub(crate) selected: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct ChoiceField {
    pub(crate) choices: Vec<Choice>,
    pub(crate) error: Option<String>,
}

impl ChoiceField {
    fn groups(groups: &[Group], selected: &str) -> Self {
        let selected = selected.trim();
        let empty = Choice {
            value: String::new(),
            label: EMPTY_CHOICE_LABEL.to_string(),
            selected: selected.is_empty(),
        };
        let choices = std::iter::once(empty)
            .chain(groups.iter().map(|group| {
                let value = group.id.to_string();
                Choice {
                    selected: value == selected,
                    value,
                    label: group.title.clone(),
                }
            }))
            .collect();

        Self {
            choices,
            error: None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FileField {
    pub(crate) current_url: Option<String>,
    pub(crate) error: Option<String>,
}

/// Описание полей формы поста для шаблона.
#[derive(Debug, Clone)]
pub(crate) struct PostFormView {
    pub(crate) text: TextField,
    pub(crate) group: ChoiceField,
    pub(crate) image: FileField,
}

impl PostFormView {
    pub(crate) fn blank(groups: &[Group]) -> Self {
        Self {
            text: TextField {
                value: String::new(),
                error: None,
            },
            group: ChoiceField::groups(groups, ""),
            image: FileField {
                current_url: None,
                error: None,
            },
        }
    }

    pub(crate) fn for_post(post: &Post, groups: &[Group], media_url: &str) -> Self {
        let selected = post
            .group
            .as_ref()
            .map(|group| group.id.to_string())
            .unwrap_or_default();

        Self {
            text: TextField {
                value: post.text.clone(),
                error: None,
            },
            group: ChoiceField::groups(groups, &selected),
            image: FileField {
                current_url: post.image.as_deref().map(|image| media_path(media_url, image)),
                error: None,
            },
        }
    }

    pub(crate) fn from_submission(
        form: PostFormData,
        errors: FormErrors,
        groups: &[Group],
        current_url: Option<String>,
    ) -> Self {
        let mut group = ChoiceField::groups(groups, &form.group);
        group.error = errors.group;

        Self {
            text: TextField {
                value: form.text,
                error: errors.text,
            },
            group,
            image: FileField {
                current_url,
                error: errors.image,
            },
        }
    }
}
