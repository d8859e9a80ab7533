pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod services;
pub mod utils;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use mongodb::{options::ClientOptions, Client};
use secrecy::ExposeSecret;
use service_core::middleware::security_headers::security_headers_middleware;
use service_core::middleware::tracing::request_id_middleware;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use config::Config;
use middleware::{auth_middleware, require_admin, require_customer, require_seller};
use repository::{
    CartRepository, CategoryRepository, DashboardRepository, FileRepository, OrderRepository,
    ProductRepository, SellerRepository, ShippingRepository, UserRepository,
};
use services::audit::AuditService;
use services::jwt::JwtService;
use services::stripe::StripeClient;

// Multipart product bodies carry up to five 1MB images plus scalar fields.
const MAX_UPLOAD_BODY_BYTES: usize = 8 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: mongodb::Database,
    pub config: Config,
    pub jwt: JwtService,
    pub stripe: StripeClient,
    pub users: UserRepository,
    pub sellers: SellerRepository,
    pub categories: CategoryRepository,
    pub products: ProductRepository,
    pub files: FileRepository,
    pub carts: CartRepository,
    pub orders: OrderRepository,
    pub shipping: ShippingRepository,
    pub dashboard: DashboardRepository,
    pub audit: AuditService,
}

pub struct Application {
    port: u16,
    listener: tokio::net::TcpListener,
    router: Router,
    db: mongodb::Database,
}

impl Application {
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let mut client_options = ClientOptions::parse(config.database.url.expose_secret()).await?;
        client_options.app_name = Some(config.service_name.clone());

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database.db_name);

        let users = UserRepository::new(&db);
        let sellers = SellerRepository::new(&db);
        users.init_indexes().await?;
        sellers.init_indexes().await?;

        let stripe = StripeClient::new(config.stripe.clone());
        if stripe.is_configured() {
            tracing::info!("Stripe client initialized");
        } else {
            tracing::warn!("Stripe credentials not configured - checkout will be unavailable");
        }

        let state = AppState {
            jwt: JwtService::new(&config.jwt),
            stripe,
            users,
            sellers,
            categories: CategoryRepository::new(&db),
            products: ProductRepository::new(&db),
            files: FileRepository::new(&db),
            carts: CartRepository::new(&db),
            orders: OrderRepository::new(&db),
            shipping: ShippingRepository::new(&db),
            dashboard: DashboardRepository::new(&db),
            audit: AuditService::new(&db),
            db: db.clone(),
            config: config.clone(),
        };

        let router = build_router(state, &config)?;

        let addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router,
            db,
        })
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!("Listening on {}", self.listener.local_addr()?);
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn db(&self) -> mongodb::Database {
        self.db.clone()
    }
}

fn build_router(state: AppState, config: &Config) -> anyhow::Result<Router> {
    let auth_routes = Router::new()
        .route("/register/customer", post(handlers::auth::register_customer))
        .route("/register/seller", post(handlers::auth::register_seller))
        .route("/register/admin", post(handlers::auth::register_admin))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route(
            "/me",
            get(handlers::auth::me)
                .route_layer(from_fn_with_state(state.clone(), auth_middleware)),
        );

    let customer_users = Router::new()
        .route(
            "/profile",
            get(handlers::users::get_profile)
                .put(handlers::users::update_profile)
                .delete(handlers::users::delete_account),
        )
        .route("/change-email", put(handlers::users::change_email))
        .route("/change-password", put(handlers::users::change_password))
        .route_layer(from_fn(require_customer));

    let admin_users = Router::new()
        .route("/", get(handlers::users::list_users))
        .route(
            "/:id",
            get(handlers::users::get_user)
                .put(handlers::users::admin_update_user)
                .delete(handlers::users::admin_delete_user),
        )
        .route("/:id/change-email", put(handlers::users::admin_change_email))
        .route(
            "/:id/change-password",
            put(handlers::users::admin_change_password),
        )
        .route_layer(from_fn(require_admin));

    let users_routes = customer_users
        .merge(admin_users)
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    let seller_profile = Router::new()
        .route(
            "/profile",
            get(handlers::sellers::get_profile).put(handlers::sellers::update_profile),
        )
        .route_layer(from_fn(require_seller));

    let admin_sellers = Router::new()
        .route("/", get(handlers::sellers::list_sellers))
        .route_layer(from_fn(require_admin));

    let sellers_routes = seller_profile
        .merge(admin_sellers)
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    let public_categories = Router::new()
        .route("/", get(handlers::categories::list_categories))
        .route("/search", get(handlers::categories::search_categories))
        .route("/:id", get(handlers::categories::get_category));

    let admin_categories = Router::new()
        .route("/", post(handlers::categories::create_category))
        .route(
            "/:id",
            put(handlers::categories::update_category)
                .delete(handlers::categories::delete_category),
        )
        .route_layer(from_fn(require_admin))
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    let categories_routes = public_categories.merge(admin_categories);

    let public_products = Router::new()
        .route("/", get(handlers::products::list_products))
        .route("/banners", get(handlers::products::list_banner_products))
        .route("/newest", get(handlers::products::list_newest_products))
        .route("/featured", get(handlers::products::list_featured_products))
        .route("/search", get(handlers::products::search_products))
        .route("/filter", get(handlers::products::list_filtered_products))
        .route("/price-range", get(handlers::products::get_price_range))
        .route("/view/:id", get(handlers::products::get_product));

    let seller_products = Router::new()
        .route("/", post(handlers::products::create_product))
        .route("/seller", get(handlers::products::list_seller_products))
        .route(
            "/:id",
            put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        .route_layer(from_fn(require_seller))
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES));

    let admin_products = Router::new()
        .route(
            "/:id/banner-status",
            patch(handlers::products::update_banner_status),
        )
        .route(
            "/:id/active-status",
            patch(handlers::products::update_active_status),
        )
        .route("/admin/:id", delete(handlers::products::admin_delete_product))
        .route_layer(from_fn(require_admin))
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    let products_routes = public_products.merge(seller_products).merge(admin_products);

    let cart_routes = Router::new()
        .route(
            "/",
            get(handlers::carts::get_cart)
                .put(handlers::carts::update_cart)
                .delete(handlers::carts::clear_cart),
        )
        .route_layer(from_fn(require_customer))
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    let shipping_routes = Router::new()
        .route(
            "/",
            get(handlers::shipping::list_addresses).post(handlers::shipping::create_address),
        )
        .route(
            "/:id",
            get(handlers::shipping::get_address)
                .put(handlers::shipping::update_address)
                .delete(handlers::shipping::delete_address),
        )
        .route_layer(from_fn(require_customer))
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    let customer_orders = Router::new()
        .route("/", post(handlers::orders::create_order))
        .route("/user", get(handlers::orders::list_user_orders))
        .route("/user/:id", get(handlers::orders::get_user_order))
        .route("/cancel", put(handlers::orders::cancel_user_order))
        .route_layer(from_fn(require_customer));

    let seller_orders = Router::new()
        .route("/seller", get(handlers::orders::list_seller_orders))
        .route("/seller/item-status", put(handlers::orders::update_item_status))
        .route_layer(from_fn(require_seller));

    let admin_orders = Router::new()
        .route("/", get(handlers::orders::list_all_orders))
        .route(
            "/:id",
            get(handlers::orders::list_orders_for_user)
                .delete(handlers::orders::admin_delete_order),
        )
        .route("/:id/cancel", put(handlers::orders::admin_cancel_order))
        .route_layer(from_fn(require_admin));

    let orders_routes = customer_orders
        .merge(seller_orders)
        .merge(admin_orders)
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    let checkout_routes = Router::new()
        .route(
            "/create-checkout-session",
            post(handlers::payment::create_checkout_session),
        )
        .route_layer(from_fn(require_customer))
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    // The webhook stays outside the session stack; Stripe authenticates with
    // its signature header instead.
    let payment_routes = checkout_routes.route("/webhook", post(handlers::payment::webhook));

    let dashboard_routes = Router::new()
        .route(
            "/admin",
            get(handlers::dashboard::admin_dashboard).route_layer(from_fn(require_admin)),
        )
        .route(
            "/seller",
            get(handlers::dashboard::seller_dashboard).route_layer(from_fn(require_seller)),
        )
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    let cors = CorsLayer::new()
        .allow_origin(config.frontend_url.parse::<HeaderValue>()?)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/auth", auth_routes)
        .nest("/users", users_routes)
        .nest("/sellers", sellers_routes)
        .nest("/categories", categories_routes)
        .nest("/products", products_routes)
        .nest("/cart", cart_routes)
        .nest("/shipping", shipping_routes)
        .nest("/orders", orders_routes)
        .nest("/payment", payment_routes)
        .nest("/dashboard", dashboard_routes)
        .nest_service("/uploads", ServeDir::new(&config.uploads.dir))
        .layer(cors)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .with_state(state);

    Ok(router)
}
