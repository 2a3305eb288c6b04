mod admin_test;
mod batch_test;
mod category_test;
mod credit_test;
mod favorite_test;
mod helpers;
mod payment_test;
mod resource_test;
mod router_test;
