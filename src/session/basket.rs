//! 购物篮：菜单项 + 数量
//!
//! add 追加一件（同 id 已存在则该行数量 +1），remove 按行位置取走一件（数量归 0 时删除该行），
//! set_quantity 以增量调整并夹到 0 以下不再减少。因此 add / remove 序列只取决于最终的菜品多重集合。
//! 总价 = Σ 数量 × 价格，缺失或非法价格按 0；计算是纯函数，重复调用结果一致。

use std::collections::HashMap;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::models::MenuItem;

/// 购物篮中的一行
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BasketLine {
    pub item: MenuItem,
    pub quantity: u32,
}

impl BasketLine {
    pub fn subtotal(&self) -> f64 {
        self.item.effective_price() * f64::from(self.quantity)
    }
}

/// 结账结果
#[derive(Clone, Debug)]
pub struct OrderSummary {
    pub lines: Vec<BasketLine>,
    pub total: f64,
    pub placed_at: DateTime<Local>,
}

#[derive(Clone, Debug, Default)]
pub struct Basket {
    lines: Vec<BasketLine>,
}

impl Basket {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一个菜品；已在篮中则数量 +1。返回该菜品当前数量
    pub fn add(&mut self, item: MenuItem) -> u32 {
        if let Some(line) = self.lines.iter_mut().find(|l| l.item.id == item.id) {
            line.quantity = line.quantity.saturating_add(1);
            return line.quantity;
        }
        self.lines.push(BasketLine { item, quantity: 1 });
        1
    }

    /// 从第 index 行取走一件，数量归 0 时删除该行；返回被取走的菜品，越界返回 None
    pub fn remove(&mut self, index: usize) -> Option<MenuItem> {
        let line = self.lines.get_mut(index)?;
        line.quantity = line.quantity.saturating_sub(1);
        if line.quantity == 0 {
            Some(self.lines.remove(index).item)
        } else {
            Some(line.item.clone())
        }
    }

    /// 数量调整为 max(0, 当前 + delta)；篮中没有该 id 时为 no-op 并返回 None
    pub fn set_quantity(&mut self, item_id: &str, delta: i64) -> Option<u32> {
        let line = self.lines.iter_mut().find(|l| l.item.id == item_id)?;
        let next = (i64::from(line.quantity) + delta).clamp(0, i64::from(u32::MAX));
        line.quantity = next as u32;
        Some(line.quantity)
    }

    /// 数量调整；菜品不在篮中且 delta > 0 时先加入（菜单卡片上的 +/- 按钮）
    pub fn adjust(&mut self, item: &MenuItem, delta: i64) -> u32 {
        if delta > 0 && !self.contains(&item.id) {
            self.lines.push(BasketLine {
                item: item.clone(),
                quantity: 0,
            });
        }
        self.set_quantity(&item.id, delta).unwrap_or(0)
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.lines.iter().any(|l| l.item.id == item_id)
    }

    pub fn quantity(&self, item_id: &str) -> u32 {
        self.lines
            .iter()
            .find(|l| l.item.id == item_id)
            .map(|l| l.quantity)
            .unwrap_or(0)
    }

    /// 以篮中菜品快照的价格计算总价
    pub fn total(&self) -> f64 {
        self.lines.iter().map(BasketLine::subtotal).fold(0.0, |acc, x| acc + x)
    }

    /// 以当前菜单的价格重新计算总价；不在当前菜单中的菜品计 0
    pub fn total_against(&self, menu: &[MenuItem]) -> f64 {
        let prices: HashMap<&str, f64> = menu
            .iter()
            .map(|m| (m.id.as_str(), m.effective_price()))
            .collect();
        self.lines
            .iter()
            .map(|l| prices.get(l.item.id.as_str()).copied().unwrap_or(0.0) * f64::from(l.quantity))
            .fold(0.0, |acc, x| acc + x)
    }

    pub fn lines(&self) -> &[BasketLine] {
        &self.lines
    }

    /// 件数（所有行数量之和），用于 "Basket (n)" 徽标
    pub fn len(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// 结账：返回订单摘要并清空购物篮（数量为 0 的行不计入订单）
    pub fn checkout(&mut self) -> OrderSummary {
        let total = self.total();
        let lines = std::mem::take(&mut self.lines)
            .into_iter()
            .filter(|l| l.quantity > 0)
            .collect();
        OrderSummary {
            lines,
            total,
            placed_at: Local::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: f64) -> MenuItem {
        MenuItem::new(id, format!("Dish {}", id), "", price)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_add_increments_existing() {
        let mut basket = Basket::new();
        assert_eq!(basket.add(item("1", 5.0)), 1);
        assert_eq!(basket.add(item("1", 5.0)), 2);
        assert_eq!(basket.add(item("2", 3.0)), 1);
        assert_eq!(basket.lines().len(), 2);
        assert_eq!(basket.len(), 3);
        assert!(approx(basket.total(), 13.0));
    }

    #[test]
    fn test_remove_by_index() {
        let mut basket = Basket::new();
        basket.add(item("1", 5.0));
        basket.add(item("2", 3.0));
        let removed = basket.remove(0).unwrap();
        assert_eq!(removed.id, "1");
        assert!(basket.remove(5).is_none());
        assert!(approx(basket.total(), 3.0));
    }

    #[test]
    fn test_set_quantity_never_negative() {
        let mut basket = Basket::new();
        basket.add(item("1", 2.0));
        let deltas = [3, -2, -10, 1, -1, -1, 4];
        let mut expected: i64 = 1;
        for delta in deltas {
            expected = (expected + delta).max(0);
            assert_eq!(basket.set_quantity("1", delta), Some(expected as u32));
        }
        assert_eq!(basket.set_quantity("missing", 1), None);
    }

    #[test]
    fn test_add_add_remove_leaves_one_unit() {
        let mut basket = Basket::new();
        basket.add(item("soup", 5.0));
        basket.add(item("soup", 5.0));
        assert_eq!(basket.remove(0).unwrap().id, "soup");
        assert_eq!(basket.len(), 1);
        assert_eq!(basket.quantity("soup"), 1);
        assert!(approx(basket.total(), 5.0));

        basket.remove(0);
        assert!(basket.lines().is_empty());
        assert!(basket.remove(0).is_none());
    }

    #[test]
    fn test_empty_total_is_positive_zero() {
        let mut basket = Basket::new();
        assert!(basket.total().is_sign_positive());
        basket.add(item("1", 3.0));
        basket.remove(0);
        assert_eq!(basket.total(), 0.0);
        assert!(basket.total().is_sign_positive());
        assert!(basket.total_against(&[]).is_sign_positive());
    }

    #[test]
    fn test_same_multiset_same_total() {
        // a, b, a, 删 b  与  a, a 得到同一多重集合
        let mut x = Basket::new();
        x.add(item("a", 2.5));
        x.add(item("b", 4.0));
        x.add(item("a", 2.5));
        x.remove(1);

        let mut y = Basket::new();
        y.add(item("a", 2.5));
        y.add(item("a", 2.5));

        assert!(approx(x.total(), y.total()));
        assert_eq!(x.len(), y.len());
    }

    #[test]
    fn test_total_order_invariant() {
        let mut a = Basket::new();
        a.add(item("1", 4.5));
        a.add(item("2", 1.25));
        a.add(item("3", 10.0));
        a.remove(2);

        let mut b = Basket::new();
        b.add(item("2", 1.25));
        b.add(item("1", 4.5));

        assert!(approx(a.total(), b.total()));
        assert!(approx(a.total(), a.total()));
    }

    #[test]
    fn test_invalid_price_counts_as_zero() {
        let mut basket = Basket::new();
        basket.add(item("1", f64::NAN));
        basket.add(item("2", -4.0));
        basket.add(item("3", 2.0));
        assert!(approx(basket.total(), 2.0));
    }

    #[test]
    fn test_total_against_current_menu() {
        let mut basket = Basket::new();
        basket.add(item("1", 5.0));
        basket.add(item("1", 5.0));
        basket.add(item("gone", 9.0));
        let menu = vec![item("1", 6.0), item("2", 1.0)];
        assert!(approx(basket.total_against(&menu), 12.0));
    }

    #[test]
    fn test_adjust_adds_then_clamps() {
        let mut basket = Basket::new();
        let dish = item("7", 3.0);
        assert_eq!(basket.adjust(&dish, -1), 0);
        assert!(!basket.contains("7"));
        assert_eq!(basket.adjust(&dish, 1), 1);
        assert_eq!(basket.adjust(&dish, 1), 2);
        assert_eq!(basket.adjust(&dish, -5), 0);
        assert!(basket.is_empty());
    }

    #[test]
    fn test_checkout_clears() {
        let mut basket = Basket::new();
        basket.add(item("1", 2.5));
        basket.add(item("2", 1.0));
        basket.set_quantity("2", -1);
        let order = basket.checkout();
        assert_eq!(order.lines.len(), 1);
        assert!(approx(order.total, 2.5));
        assert!(basket.lines().is_empty());
    }
}
