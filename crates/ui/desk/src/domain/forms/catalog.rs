//! The two portal forms: new opportunity and volunteer signup.
//!
//! Field keys are the names the server-rendered forms post, so a filled
//! `FormState` can be submitted as-is.

use portal::{Category, Opportunity};

use super::{FormField, FormFieldKind, FormSchema, RequiredFields, SelectOption};

pub const OPPORTUNITY_PATH: &str = "/opportunities/add/";
pub const SIGNUP_PATH: &str = "/signup/";

const REQUIRED: &str = "This field is required.";

pub fn opportunity_required() -> RequiredFields {
    RequiredFields::new([
        ("title", REQUIRED),
        ("category", REQUIRED),
        ("date", REQUIRED),
        ("description", REQUIRED),
    ])
}

pub fn signup_required() -> RequiredFields {
    RequiredFields::new([
        ("name", "Name is required."),
        ("age", "Age is required."),
        ("expertise", "Please describe your expertise."),
        ("opportunity", "Please select an opportunity."),
    ])
}

pub fn opportunity_form(categories: &[Category]) -> FormSchema {
    let options = std::iter::once(SelectOption::placeholder())
        .chain(
            categories
                .iter()
                .map(|c| SelectOption::new(c.id.to_string(), c.name.clone())),
        )
        .collect();

    FormSchema::new(
        "Add Volunteer Opportunity",
        OPPORTUNITY_PATH,
        vec![
            FormField::new("title", "Title", FormFieldKind::Text),
            FormField::new("description", "Description", FormFieldKind::Multiline),
            FormField::new("date", "Date", FormFieldKind::Date).help("YYYY-MM-DD"),
            FormField::new("category", "Category", FormFieldKind::Select { options }),
        ],
    )
    .description("Create a new opportunity for volunteers to sign up for.")
}

pub fn signup_form(opportunities: &[Opportunity]) -> FormSchema {
    let options = std::iter::once(SelectOption::placeholder())
        .chain(
            opportunities
                .iter()
                .map(|o| SelectOption::new(o.id.to_string(), o.option_label())),
        )
        .collect();

    FormSchema::new(
        "Volunteer Sign Up",
        SIGNUP_PATH,
        vec![
            FormField::new("name", "Full Name", FormFieldKind::Text),
            FormField::new("age", "Age", FormFieldKind::Number).help("Must be 18 or older"),
            FormField::new("expertise", "Expertise", FormFieldKind::Multiline),
            FormField::new("opportunity", "Opportunity", FormFieldKind::Select { options }),
        ],
    )
    .busy_label("Signing Up...")
}

/// Title shown in the signup preview for the selected option label.
///
/// The placeholder (and an empty selection) shows nothing.
pub fn preview_title(option: Option<&SelectOption>) -> Option<&str> {
    let option = option?;
    if option.is_placeholder() || option.label == SelectOption::PLACEHOLDER {
        return None;
    }
    option.label.split(" - ").next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use portal::model::CategoryRef;
    use pretty_assertions::assert_eq;

    fn opportunity(id: u64, title: &str) -> Opportunity {
        Opportunity {
            id,
            title: title.into(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            category: CategoryRef {
                id: 1,
                name: "Environment".into(),
                slug: "environment".into(),
            },
            volunteer_count: 0,
        }
    }

    #[test]
    fn signup_select_starts_with_placeholder() {
        let schema = signup_form(&[opportunity(7, "Beach Cleanup")]);
        let field = schema.field_by_key("opportunity").unwrap();
        let options = field.options();
        assert_eq!(options.len(), 2);
        assert!(options[0].is_placeholder());
        assert_eq!(options[1], SelectOption::new("7", "Beach Cleanup - 2024-06-01"));
    }

    #[test]
    fn preview_title_takes_part_before_separator() {
        let schema = signup_form(&[opportunity(7, "Beach Cleanup")]);
        let options = schema.field_by_key("opportunity").unwrap().options();
        assert_eq!(preview_title(options.get(1)), Some("Beach Cleanup"));
        assert_eq!(preview_title(options.first()), None);
        assert_eq!(preview_title(None), None);
    }

    #[test]
    fn field_order_matches_posted_forms() {
        let keys: Vec<_> = opportunity_form(&[])
            .fields
            .iter()
            .map(|f| f.key.clone())
            .collect();
        assert_eq!(keys, ["title", "description", "date", "category"]);
        assert_eq!(opportunity_required().len(), 4);
    }
}
