use ecu_bridge::native;

#[native]
async fn status() -> &'static str {
    "ready"
}

fn main() {}
