pub mod banners;
pub mod cart_items;
pub mod categories;
pub mod offers;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod shops;
pub mod users;

pub use banners::Entity as Banners;
pub use cart_items::Entity as CartItems;
pub use categories::Entity as Categories;
pub use offers::Entity as Offers;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use reviews::Entity as Reviews;
pub use shops::Entity as Shops;
pub use users::Entity as Users;
