// src/menu/reorder.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::menu::{Category, ComplementGroup, ComplementItem, Product, ProductGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MovePayload {
    pub direction: Direction,
}

/// Nova posição de um item depois de um movimento.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderChange {
    pub id: Uuid,
    pub display_order: i32,
}

impl From<(Uuid, i32)> for OrderChange {
    fn from((id, display_order): (Uuid, i32)) -> Self {
        Self { id, display_order }
    }
}

/// Entidades ordenáveis do cardápio.
pub trait Ordered {
    fn order_id(&self) -> Uuid;
    fn display_order(&self) -> i32;
    fn set_display_order(&mut self, order: i32);
}

macro_rules! impl_ordered {
    ($($ty:ty => $id:ident),* $(,)?) => {
        $(
            impl Ordered for $ty {
                fn order_id(&self) -> Uuid { self.$id }
                fn display_order(&self) -> i32 { self.display_order }
                fn set_display_order(&mut self, order: i32) { self.display_order = order; }
            }
        )*
    };
}

impl_ordered!(
    Category => id,
    Product => id,
    ComplementGroup => id,
    ComplementItem => id,
    ProductGroup => link_id,
);

/// Planeja a troca de posição de `id` com o vizinho.
///
/// Os irmãos são ordenados por `display_order` (empate resolvido pela posição
/// na lista) e renumerados de 0 a n-1 já com a troca aplicada. Só as entradas
/// cuja ordem mudou são devolvidas. `None` quando o id não está na lista ou
/// já está na ponta.
pub fn plan_move<T: Ordered>(siblings: &[T], id: Uuid, direction: Direction) -> Option<Vec<(Uuid, i32)>> {
    let mut ordered: Vec<&T> = siblings.iter().collect();
    // sort_by_key é estável: empates mantêm a ordem de chegada
    ordered.sort_by_key(|item| item.display_order());

    let pos = ordered.iter().position(|item| item.order_id() == id)?;
    let neighbor = match direction {
        Direction::Up => pos.checked_sub(1)?,
        Direction::Down => {
            if pos + 1 >= ordered.len() {
                return None;
            }
            pos + 1
        }
    };
    ordered.swap(pos, neighbor);

    let changes = ordered
        .iter()
        .enumerate()
        .filter(|(index, item)| item.display_order() != *index as i32)
        .map(|(index, item)| (item.order_id(), index as i32))
        .collect();
    Some(changes)
}

/// Aplica as novas posições numa cópia local e reordena.
pub fn apply_orders<T: Ordered>(items: &mut [T], orders: &[(Uuid, i32)]) {
    for item in items.iter_mut() {
        if let Some((_, order)) = orders.iter().find(|(id, _)| *id == item.order_id()) {
            item.set_display_order(*order);
        }
    }
    items.sort_by_key(|item| item.display_order());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Row {
        id: Uuid,
        order: i32,
    }

    impl Ordered for Row {
        fn order_id(&self) -> Uuid {
            self.id
        }
        fn display_order(&self) -> i32 {
            self.order
        }
        fn set_display_order(&mut self, order: i32) {
            self.order = order;
        }
    }

    fn rows(orders: &[i32]) -> Vec<Row> {
        orders.iter().map(|&order| Row { id: Uuid::new_v4(), order }).collect()
    }

    #[test]
    fn moving_up_swaps_with_previous() {
        let list = rows(&[0, 1, 2]);
        let changes = plan_move(&list, list[2].id, Direction::Up).unwrap();

        assert_eq!(changes.len(), 2);
        assert!(changes.contains(&(list[2].id, 1)));
        assert!(changes.contains(&(list[1].id, 2)));
    }

    #[test]
    fn moving_down_swaps_with_next() {
        let list = rows(&[0, 1, 2]);
        let changes = plan_move(&list, list[0].id, Direction::Down).unwrap();

        assert!(changes.contains(&(list[0].id, 1)));
        assert!(changes.contains(&(list[1].id, 0)));
    }

    #[test]
    fn edges_and_unknown_ids_are_no_ops() {
        let list = rows(&[0, 1, 2]);
        assert!(plan_move(&list, list[0].id, Direction::Up).is_none());
        assert!(plan_move(&list, list[2].id, Direction::Down).is_none());
        assert!(plan_move(&list, Uuid::new_v4(), Direction::Up).is_none());
        assert!(plan_move::<Row>(&[], Uuid::new_v4(), Direction::Down).is_none());
    }

    #[test]
    fn ties_are_normalized_by_position() {
        // Todos com ordem 0 (linhas antigas sem ordem definida)
        let list = rows(&[0, 0, 0]);
        let mut local = list.clone();
        let changes = plan_move(&list, list[1].id, Direction::Up).unwrap();
        apply_orders(&mut local, &changes);

        let ids: Vec<Uuid> = local.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![list[1].id, list[0].id, list[2].id]);
        let orders: Vec<i32> = local.iter().map(|r| r.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn gaps_are_compacted() {
        let list = rows(&[10, 20, 30]);
        let mut local = list.clone();
        let changes = plan_move(&list, list[1].id, Direction::Down).unwrap();
        apply_orders(&mut local, &changes);

        let ids: Vec<Uuid> = local.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![list[0].id, list[2].id, list[1].id]);
    }
}
