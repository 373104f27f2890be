use uuid::Uuid;

use crate::models::menu::Named;

/// Nome legível de `id` dentro de `list`, ou `""` quando não houver id ou correspondência.
pub fn display_name<T: Named>(id: Option<Uuid>, list: &[T]) -> &str {
    id.and_then(|id| list.iter().find(|item| item.id() == id))
        .map_or("", |item| item.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::menu::Category;
    use chrono::Utc;

    fn category(name: &str) -> Category {
        Category {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            display_order: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn finds_name_by_id() {
        let list = vec![category("Pizzas"), category("Bebidas")];
        assert_eq!(display_name(Some(list[1].id), &list), "Bebidas");
    }

    #[test]
    fn unknown_or_missing_id_yields_empty_string() {
        let list = vec![category("Pizzas")];
        assert_eq!(display_name(None, &list), "");
        assert_eq!(display_name(Some(Uuid::new_v4()), &list), "");
        assert_eq!(display_name::<Category>(Some(Uuid::new_v4()), &[]), "");
    }

    #[test]
    fn first_match_wins() {
        let first = category("Primeira");
        let mut duplicate = category("Segunda");
        duplicate.id = first.id;
        let list = vec![first.clone(), duplicate];
        assert_eq!(display_name(Some(first.id), &list), "Primeira");
    }
}
