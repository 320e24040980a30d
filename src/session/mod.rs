//! 会话状态容器：购物篮与收藏，仅存于内存，随应用退出而消失

pub mod basket;
pub mod favorites;

pub use basket::{Basket, BasketLine, OrderSummary};
pub use favorites::Favorites;
