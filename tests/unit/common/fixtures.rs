//! Pipeline definition fixtures

/// A collection pipeline in the shared-template style: matrix jobs expanded
/// from `targets` x `groups`, a coverage stage to ignore, entries for older
/// core branches to skip, and a pinned test container.
pub const COLLECTION_PIPELINE: &str = "
trigger:
  batch: true
  branches:
    include:
      - main

resources:
  containers:
    - container: default
      image: quay.io/ansible/azure-pipelines-test-container:2.0

stages:
  - stage: Sanity
    jobs:
      - template: templates/matrix.yml
        parameters:
          testFormat: devel/{0}
          targets:
            - test: sanity
            - test: units
  - stage: Remote_devel
    jobs:
      - template: templates/matrix.yml
        parameters:
          testFormat: devel/{0}/{1}
          targets:
            - test: fedora/37
            - test: rhel/9.1
          groups:
            - 1
            - 2
  - stage: Remote_2_14
    jobs:
      - template: templates/matrix.yml
        parameters:
          testFormat: stable-2.14/{0}/{1}
          targets:
            - test: fedora/36
          groups:
            - 1
  - stage: Finish
    jobs:
      - template: templates/coverage.yml
";

/// The reference pipeline the canonical matrix is extracted from.
pub const CORE_PIPELINE: &str = "
resources:
  containers:
    - container: default
      image: quay.io/ansible/azure-pipelines-test-container:2.1

stages:
  - stage: Remote
    jobs:
      - template: templates/matrix.yml
        parameters:
          testFormat: '{0}/{1}'
          targets:
            - test: fedora/39
            - test: rhel/9.3
            - test: alpine/3.19
          groups:
            - 1
";

/// A minimal observed pipeline with one stale platform entry.
pub const STALE_LINUX_PIPELINE: &str = "
jobs:
  - job: linux
    strategy:
      matrix:
        py39:
          platform: linux
          python: '3.9'
";

/// The matching reference: linux tested at 3.9 and 3.11.
pub const CANONICAL_LINUX_PIPELINE: &str = "
jobs:
  - job: linux
    strategy:
      matrix:
        py311:
          platform: linux
          python: '3.11'
        py39:
          platform: linux
          python: '3.9'
";

/// A pipeline pinning the container to a floating tag.
pub const UNPINNED_CONTAINER_PIPELINE: &str = "
resources:
  containers:
    - container: default
      image: quay.io/ansible/azure-pipelines-test-container:latest

jobs: []
";
