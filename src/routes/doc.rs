use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        MessageResponse,
        admin::{AdminOrderDetail, CustomerInfo, DashboardStats, UpdateOrderStatusRequest},
        cart::{AddToCartRequest, CartItemDetail, CartView, UpdateCartItemRequest},
        orders::{CreateOrderRequest, OrderCreated, OrderDetail, OrderItemDetail},
        payment::{ConfirmPaymentRequest, PaymentConfirmed},
        products::{CreateProductRequest, UpdateProductRequest},
    },
    models::{CartItem, Order, OrderItem, Payment, Product, User},
    routes::{admin, cart, health, health::HealthData, orders, params, payment, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        products::list_products,
        products::get_product,
        products::list_categories,
        cart::cart_view,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_from_cart,
        cart::clear_cart,
        orders::create_order,
        orders::list_orders,
        orders::get_order,
        payment::confirm_payment,
        payment::get_payment,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::create_product,
        admin::update_product,
        admin::dashboard_stats
    ),
    components(
        schemas(
            HealthData,
            User,
            Product,
            CartItem,
            Order,
            OrderItem,
            Payment,
            MessageResponse,
            AddToCartRequest,
            UpdateCartItemRequest,
            CartItemDetail,
            CartView,
            CreateOrderRequest,
            OrderCreated,
            OrderItemDetail,
            OrderDetail,
            ConfirmPaymentRequest,
            PaymentConfirmed,
            UpdateOrderStatusRequest,
            AdminOrderDetail,
            CustomerInfo,
            DashboardStats,
            CreateProductRequest,
            UpdateProductRequest,
            params::ProductQuery,
            params::OrderListQuery
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Payment", description = "Payment confirmation endpoints"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
