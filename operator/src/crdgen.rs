use kube::CustomResourceExt;

use elasticsearch_operator::policy::ResourcePolicy;

fn main() {
    print!(
        "{}",
        serde_yaml::to_string(&ResourcePolicy::crd()).expect("CRD should serialize to YAML")
    );
}
