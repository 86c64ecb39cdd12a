use crate::columns::{ColumnModel, Formatter};
use crate::domain::PVError;

/// Columns of the product listing, in display order.
pub fn product_columns() -> Result<ColumnModel, PVError> {
    let mut columns = ColumnModel::new();
    columns
        .define("id", "ID", Formatter::Number)?
        .define("title", "Product Name", Formatter::Text)?
        .define("description", "Description", Formatter::Text)?
        .define("category", "Category", Formatter::Text)?
        .define("price", "Price", Formatter::Currency { symbol: '$' })?
        .define("discountPercentage", "Discount Percentage", Formatter::Ratio)?
        .define("rating", "Rating", Formatter::Rating)?
        .define("stock", "Stock", Formatter::Quantity)?
        .define("tags", "Tags", Formatter::TagList)?
        .define("brand", "Brand", Formatter::Text)?
        .define("sku", "Sku", Formatter::Text)?
        .define("weight", "Weight", Formatter::Number)?
        .define("dimensions", "Dimension", Formatter::Dimensions)?
        .define("warrantyInformation", "warrantyInformation", Formatter::Text)?
        .define("shippingInformation", "shippingInformation", Formatter::Text)?
        .define("availabilityStatus", "availabilityStatus", Formatter::Text)?
        .define("reviews", "Reviews", Formatter::Reviews)?
        .define("returnPolicy", "Return Policy", Formatter::Text)?
        .define("minimumOrderQuantity", "Min Order Qty", Formatter::Number)?
        .define("meta", "Meta Information", Formatter::Meta)?
        .define("images", "Images", Formatter::ImageList)?
        .define("thumbnail", "Thumbnail", Formatter::Image)?;
    Ok(columns)
}
